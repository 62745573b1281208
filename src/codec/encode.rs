//! Encoding messages into HTTP payloads.
//!
//! Server side: a response message becomes the JSON response body.
//! Client side: a request message becomes path segments, query pairs and an
//! optional JSON body, following the method's `HttpRule`.

use serde_json::Value;
use thiserror::Error;

use crate::codec::schema::{Cardinality, FieldKind, FieldPath, Message, MessageSchema};
use crate::descriptor::{BodySelector, HttpRule};
use crate::routing::{RoutePattern, Segment};

/// Errors raised while encoding a message.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("message did not serialize to a JSON object")]
    NotAnObject,

    #[error("path parameter {0:?} is missing or empty")]
    MissingPathParam(String),

    #[error("field {0:?} cannot be carried in a path segment")]
    NonScalarPathParam(String),

    #[error("path parameter {0:?} contains an empty, \".\" or \"..\" segment")]
    UnroutableSegment(String),

    #[error("response field {0:?} is missing")]
    MissingField(String),

    #[error("field {0:?} cannot be carried in a query string")]
    Unrepresentable(String),
}

/// An outbound request before it is attached to a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    /// Unencoded path segments; the client percent-encodes each one.
    pub segments: Vec<String>,
    /// Query pairs in a stable order.
    pub query: Vec<(String, String)>,
    /// JSON body, if the rule carries one.
    pub body: Option<Vec<u8>>,
}

/// Serialize a response message, honoring the response body selector.
pub fn encode_response<T: Message>(message: &T, response_body: Option<&str>) -> Result<Vec<u8>, EncodeError> {
    let Some(field) = response_body else {
        return Ok(serde_json::to_vec(message)?);
    };
    let value = serde_json::to_value(message)?
        .as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or_else(|| EncodeError::MissingField(field.to_string()))?;
    Ok(serde_json::to_vec(&value)?)
}

/// Split a request message into path, query and body per the rule.
pub fn encode_request<T: Message>(
    rule: &HttpRule,
    pattern: &RoutePattern,
    message: &T,
) -> Result<EncodedRequest, EncodeError> {
    let value = serde_json::to_value(message)?;
    if !value.is_object() {
        return Err(EncodeError::NotAnObject);
    }

    let mut reserved: Vec<FieldPath> = Vec::new();
    let mut segments = Vec::with_capacity(pattern.segments().len());

    for segment in pattern.segments() {
        match segment {
            Segment::Literal(literal) => segments.push(literal.clone()),
            Segment::Variable(name) => {
                let (path, text) = path_value(&value, name)?;
                check_segment(name, &text)?;
                segments.push(text);
                reserved.push(path);
            }
            Segment::Greedy(name) => {
                let (path, text) = path_value(&value, name)?;
                for part in text.split('/') {
                    check_segment(name, part)?;
                    segments.push(part.to_string());
                }
                reserved.push(path);
            }
        }
    }

    let schema = T::schema();
    let mut query = Vec::new();
    let body = match &rule.body {
        BodySelector::Whole => Some(serde_json::to_vec(&value)?),
        BodySelector::Field(name) => {
            let field_value = value.get(name.as_str()).cloned().unwrap_or(Value::Null);
            if let Some(path) = FieldPath::parse(name) {
                reserved.push(path);
            }
            flatten_query(schema, &value, "", &reserved, &mut query)?;
            Some(serde_json::to_vec(&field_value)?)
        }
        BodySelector::None => {
            flatten_query(schema, &value, "", &reserved, &mut query)?;
            None
        }
    };

    Ok(EncodedRequest { segments, query, body })
}

fn path_value(value: &Value, name: &str) -> Result<(FieldPath, String), EncodeError> {
    let path = FieldPath::parse(name).ok_or_else(|| EncodeError::MissingPathParam(name.to_string()))?;
    let text = match path.get(value) {
        None | Some(Value::Null) => return Err(EncodeError::MissingPathParam(name.to_string())),
        Some(scalar) => scalar_text(scalar).ok_or_else(|| EncodeError::NonScalarPathParam(name.to_string()))?,
    };
    if text.is_empty() {
        return Err(EncodeError::MissingPathParam(name.to_string()));
    }
    Ok((path, text))
}

/// URL normalization drops `.` and `..` (even percent-encoded) and the server
/// never matches an empty segment.
fn check_segment(name: &str, segment: &str) -> Result<(), EncodeError> {
    if is_unroutable_segment(segment) {
        return Err(EncodeError::UnroutableSegment(name.to_string()));
    }
    Ok(())
}

pub(crate) fn is_unroutable_segment(segment: &str) -> bool {
    matches!(segment, "" | "." | "..")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Flatten the fields not bound elsewhere into dotted query pairs.
///
/// Singular fields holding their zero value are omitted; the server decodes
/// an absent field to the same value.
fn flatten_query(
    schema: &'static MessageSchema,
    value: &Value,
    prefix: &str,
    reserved: &[FieldPath],
    out: &mut Vec<(String, String)>,
) -> Result<(), EncodeError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };

    for field in schema.fields {
        let key = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        let Some(path) = FieldPath::parse(&key) else {
            continue;
        };
        if reserved.iter().any(|r| r == &path) {
            continue;
        }

        let child = match object.get(field.name) {
            None | Some(Value::Null) => continue,
            Some(child) => child,
        };

        match (field.kind, child) {
            (FieldKind::Message(nested), Value::Object(_)) if field.cardinality != Cardinality::Repeated => {
                let before = out.len();
                flatten_query(nested(), child, &key, reserved, out)?;
                // A present optional message with nothing to send would decode as absent.
                if field.cardinality == Cardinality::Optional
                    && out.len() == before
                    && !reserved.iter().any(|r| r.parts().starts_with(path.parts()))
                {
                    return Err(EncodeError::Unrepresentable(key));
                }
            }
            (FieldKind::Message(_), _) => {
                if !is_empty_container(child) {
                    return Err(EncodeError::Unrepresentable(key));
                }
            }
            (_, Value::Array(items)) => {
                for item in items {
                    let text = scalar_text(item).ok_or_else(|| EncodeError::Unrepresentable(key.clone()))?;
                    out.push((key.clone(), text));
                }
            }
            (_, scalar) => {
                if field.cardinality == Cardinality::Singular && is_zero(scalar) {
                    continue;
                }
                let text = scalar_text(scalar).ok_or_else(|| EncodeError::Unrepresentable(key.clone()))?;
                out.push((key, text));
            }
        }
    }
    Ok(())
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}
