//! Decoding HTTP requests and responses into messages.
//!
//! # Binding Order (server side)
//! 1. Path variables, in template order, by dotted field path
//! 2. Body: `*` merges over the path values, a named field fills only that field
//! 3. Query parameters for every field not bound by the path or body
//!    (skipped when the body selector is `*`)
//!
//! The merged JSON value is then normalized against the message schema and
//! handed to serde.

use serde_json::{Map, Value};
use thiserror::Error;
use url::form_urlencoded;

use crate::codec::schema::{Cardinality, FieldKind, FieldPath, FieldSchema, Message, MessageSchema};
use crate::descriptor::{BodySelector, HttpRule};
use crate::routing::PathParams;

/// Errors raised while decoding an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed JSON body: {0}")]
    MalformedJson(String),

    #[error("expected a JSON object for {0}")]
    NotAnObject(String),

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("field {field:?} expects {expected}, got {value:?}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("field {0:?} given more than once")]
    DuplicateValue(String),

    #[error("query parameter {0:?} collides with a path or body field")]
    Conflict(String),

    #[error("invalid message: {0}")]
    Invalid(String),
}

/// Decoder behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject unknown JSON fields and unknown query keys.
    pub strict: bool,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Build a request message from a matched route, query string and body.
pub fn decode_request<T: Message>(
    rule: &HttpRule,
    params: &PathParams,
    query: Option<&str>,
    body: &[u8],
    options: DecodeOptions,
) -> Result<T, DecodeError> {
    let schema = T::schema();
    let mut root = Map::new();
    let mut reserved: Vec<FieldPath> = Vec::new();

    for (name, raw) in params.iter() {
        let path = FieldPath::parse(name).ok_or_else(|| DecodeError::UnknownField(name.to_string()))?;
        let field = schema
            .resolve(&path)
            .ok_or_else(|| DecodeError::UnknownField(name.to_string()))?;
        let value = coerce_scalar(field, &path, raw)?;
        path.set(&mut root, value)
            .map_err(|_| DecodeError::NotAnObject(path.to_string()))?;
        reserved.push(path);
    }

    match &rule.body {
        BodySelector::Whole => {
            if let Some(value) = parse_body(body)? {
                match value {
                    Value::Object(object) => merge(&mut root, object),
                    _ => return Err(DecodeError::NotAnObject("request body".into())),
                }
            }
        }
        BodySelector::Field(name) => {
            if schema.field(name).is_none() {
                return Err(DecodeError::UnknownField(name.clone()));
            }
            if let Some(value) = parse_body(body)? {
                let mut wrapper = Map::new();
                wrapper.insert(name.clone(), value);
                merge(&mut root, wrapper);
            }
            if let Some(path) = FieldPath::parse(name) {
                reserved.push(path);
            }
        }
        BodySelector::None => {}
    }

    if rule.body != BodySelector::Whole {
        if let Some(query) = query {
            bind_query(schema, &mut root, &reserved, query, options)?;
        }
    }

    let mut value = Value::Object(root);
    normalize(schema, &mut value, "", options)?;
    serde_json::from_value(value).map_err(|e| DecodeError::Invalid(e.to_string()))
}

/// Decode a response body, re-wrapping it when the rule selects one response field.
pub fn decode_response<T: Message>(
    body: &[u8],
    response_body: Option<&str>,
    options: DecodeOptions,
) -> Result<T, DecodeError> {
    let value = parse_body(body)?;
    let mut value = match response_body {
        Some(field) => {
            let mut wrapper = Map::new();
            if let Some(value) = value {
                wrapper.insert(field.to_string(), value);
            }
            Value::Object(wrapper)
        }
        None => value.unwrap_or_else(|| Value::Object(Map::new())),
    };

    if !value.is_object() {
        return Err(DecodeError::NotAnObject("response body".into()));
    }
    normalize(T::schema(), &mut value, "", options)?;
    serde_json::from_value(value).map_err(|e| DecodeError::Invalid(e.to_string()))
}

/// Parse a body; an empty body yields `None`.
fn parse_body(body: &[u8]) -> Result<Option<Value>, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| DecodeError::MalformedJson(e.to_string()))
}

/// Deep merge; leaf values from `source` win.
fn merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match target.get_mut(&key) {
            Some(Value::Object(existing)) if incoming.is_object() => {
                if let Value::Object(incoming) = incoming {
                    merge(existing, incoming);
                }
            }
            _ => {
                target.insert(key, incoming);
            }
        }
    }
}

fn bind_query(
    schema: &'static MessageSchema,
    root: &mut Map<String, Value>,
    reserved: &[FieldPath],
    query: &str,
    options: DecodeOptions,
) -> Result<(), DecodeError> {
    let mut singular: Vec<FieldPath> = Vec::new();
    let mut repeated: Vec<(FieldPath, Vec<Value>)> = Vec::new();

    for (key, raw) in form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let resolved = FieldPath::parse(&key).and_then(|path| schema.resolve(&path).map(|f| (path, f)));
        let (path, field) = match resolved {
            Some(found) => found,
            None if options.strict => return Err(DecodeError::UnknownField(key.into_owned())),
            None => {
                tracing::debug!(key = %key, "Ignoring unknown query parameter");
                continue;
            }
        };

        if reserved.iter().any(|r| r.intersects(&path)) {
            return Err(DecodeError::Conflict(key.into_owned()));
        }

        let value = coerce_scalar(field, &path, &raw)?;
        if field.cardinality == Cardinality::Repeated {
            match repeated.iter_mut().find(|(p, _)| *p == path) {
                Some((_, values)) => values.push(value),
                None => repeated.push((path, vec![value])),
            }
        } else {
            if singular.contains(&path) {
                return Err(DecodeError::DuplicateValue(path.to_string()));
            }
            path.set(root, value)
                .map_err(|_| DecodeError::NotAnObject(path.to_string()))?;
            singular.push(path);
        }
    }

    for (path, values) in repeated {
        path.set(root, Value::Array(values))
            .map_err(|_| DecodeError::NotAnObject(path.to_string()))?;
    }
    Ok(())
}

/// Turn a path or query string into a JSON value of the field's type.
pub(crate) fn coerce_scalar(field: &FieldSchema, path: &FieldPath, raw: &str) -> Result<Value, DecodeError> {
    let mismatch = |expected: &'static str| DecodeError::TypeMismatch {
        field: path.to_string(),
        expected,
        value: raw.to_string(),
    };

    match field.kind {
        FieldKind::Bool => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch("a boolean")),
        },
        FieldKind::Int32 => raw.parse::<i32>().map(Value::from).map_err(|_| mismatch("a 32-bit integer")),
        FieldKind::Int64 => raw.parse::<i64>().map(Value::from).map_err(|_| mismatch("a 64-bit integer")),
        FieldKind::Uint32 => raw
            .parse::<u32>()
            .map(Value::from)
            .map_err(|_| mismatch("an unsigned 32-bit integer")),
        FieldKind::Uint64 => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| mismatch("an unsigned 64-bit integer")),
        FieldKind::Float | FieldKind::Double => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| mismatch("a finite number")),
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Enum(values) => {
            if values.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(mismatch("an enum value name"))
            }
        }
        FieldKind::Message(_) => Err(mismatch("a scalar field")),
    }
}

/// Drop nulls of non-nullable fields and, in strict mode, reject unknown keys.
fn normalize(
    schema: &'static MessageSchema,
    value: &mut Value,
    prefix: &str,
    options: DecodeOptions,
) -> Result<(), DecodeError> {
    let Some(object) = value.as_object_mut() else {
        return Ok(());
    };

    let keys: Vec<String> = object.keys().cloned().collect();
    for key in keys {
        let qualified = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let Some(field) = schema.field(&key) else {
            if options.strict {
                return Err(DecodeError::UnknownField(qualified));
            }
            continue;
        };

        let is_null = object.get(&key).map(Value::is_null).unwrap_or(false);
        if is_null && field.cardinality != Cardinality::Optional {
            object.remove(&key);
            continue;
        }

        if let FieldKind::Message(nested) = field.kind {
            match object.get_mut(&key) {
                Some(Value::Array(items)) if field.cardinality == Cardinality::Repeated => {
                    for item in items.iter_mut() {
                        normalize(nested(), item, &qualified, options)?;
                    }
                }
                Some(child) => normalize(nested(), child, &qualified, options)?,
                None => {}
            }
        }
    }
    Ok(())
}
