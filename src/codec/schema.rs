//! Runtime message schema.
//!
//! Generated messages expose a static `MessageSchema` through the `Message` trait.
//! The codec uses it to coerce path and query strings into typed JSON values,
//! to reject unknown fields in strict mode, and to resolve dotted field paths.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A structured request or response message.
pub trait Message: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    fn schema() -> &'static MessageSchema;
}

/// Field layout of one message type.
#[derive(Debug)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl MessageSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Walk a dotted path through nested message fields.
    pub fn resolve(&'static self, path: &FieldPath) -> Option<&'static FieldSchema> {
        let mut schema: &'static MessageSchema = self;
        let mut parts = path.parts().iter().peekable();
        while let Some(part) = parts.next() {
            let field = schema.field(part)?;
            if parts.peek().is_none() {
                return Some(field);
            }
            if field.cardinality == Cardinality::Repeated {
                return None;
            }
            match field.kind {
                FieldKind::Message(nested) => schema = nested(),
                _ => return None,
            }
        }
        None
    }
}

/// A single field.
#[derive(Debug)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
}

impl FieldSchema {
    pub const fn new(name: &'static str, kind: FieldKind, cardinality: Cardinality) -> Self {
        Self {
            name,
            kind,
            cardinality,
        }
    }

    /// Scalar singular fields can be bound from a path segment.
    pub fn is_path_bindable(&self) -> bool {
        self.cardinality != Cardinality::Repeated && self.kind.is_scalar()
    }
}

/// Field value type.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    /// Enum serialized by value name.
    Enum(&'static [&'static str]),
    Message(fn() -> &'static MessageSchema),
}

impl FieldKind {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldKind::Message(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    /// Explicitly nullable.
    Optional,
    Repeated,
}

/// Dot-separated field names addressing a possibly nested field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    parts: Vec<String>,
}

impl FieldPath {
    /// Parse `a.b.c`. Returns `None` on an empty path or empty component.
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<String> = path.split('.').map(str::to_string).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The top-level field this path starts in.
    pub fn root(&self) -> &str {
        &self.parts[0]
    }

    /// True if `self` equals `other` or one is nested inside the other.
    pub fn intersects(&self, other: &FieldPath) -> bool {
        self.parts
            .iter()
            .zip(other.parts.iter())
            .all(|(a, b)| a == b)
    }

    /// Read the value at this path.
    pub fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.parts
            .iter()
            .try_fold(value, |current, part| current.as_object()?.get(part))
    }

    /// Remove and return the value at this path.
    pub fn take(&self, value: &mut Value) -> Option<Value> {
        let (last, parents) = self.parts.split_last()?;
        let mut current = value;
        for part in parents {
            current = current.as_object_mut()?.get_mut(part)?;
        }
        current.as_object_mut()?.remove(last)
    }

    /// Write `new` at this path, creating intermediate objects.
    ///
    /// Fails if an intermediate value exists and is not an object.
    pub fn set(&self, root: &mut Map<String, Value>, new: Value) -> Result<(), ()> {
        let (last, parents) = self.parts.split_last().ok_or(())?;
        let mut current = root;
        for part in parents {
            let entry = current
                .entry(part.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if entry.is_null() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut().ok_or(())?;
        }
        current.insert(last.clone(), new);
        Ok(())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}
