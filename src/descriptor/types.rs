//! Service IR definitions.
//!
//! All types derive Serde traits so an IR document can be read from JSON or TOML.
//! The same `HttpRule` is used at runtime by generated code to compile routes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A service and everything needed to generate its HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Service name in PascalCase (e.g., "GreetingService").
    pub name: String,

    /// Optional package the service was declared in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,

    /// Message types referenced by the methods.
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,

    /// Enum types referenced by message fields.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl ServiceDescriptor {
    /// Look up a message by name.
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Look up an enum by name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }
}

/// A single unary RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MethodDescriptor {
    /// Method name in PascalCase (e.g., "SayHello").
    pub name: String,

    /// Request message type name.
    pub input_type: String,

    /// Response message type name.
    pub output_type: String,

    /// HTTP binding. Methods without one are skipped or rejected by the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRule>,
}

/// HTTP binding of one method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpRule {
    /// HTTP verb.
    pub verb: HttpVerb,

    /// Path template (e.g., "/v1/greet/{name}").
    pub path: String,

    /// Which part of the request is carried in the body.
    #[serde(default)]
    pub body: BodySelector,

    /// Optional response field serialized as the whole response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
}

impl HttpRule {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            body: BodySelector::None,
            response_body: None,
        }
    }

    pub fn with_body(mut self, body: BodySelector) -> Self {
        self.body = body;
        self
    }

    pub fn with_response_body(mut self, field: impl Into<String>) -> Self {
        self.response_body = Some(field.into());
        self
    }
}

/// Supported HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    /// The equivalent `http::Method`.
    pub fn as_method(self) -> axum::http::Method {
        use axum::http::Method;
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
        }
    }

    /// Map an inbound request method; `None` for verbs no rule can bind.
    pub fn from_method(method: &axum::http::Method) -> Option<Self> {
        use axum::http::Method;
        match *method {
            Method::GET => Some(HttpVerb::Get),
            Method::POST => Some(HttpVerb::Post),
            Method::PUT => Some(HttpVerb::Put),
            Method::PATCH => Some(HttpVerb::Patch),
            Method::DELETE => Some(HttpVerb::Delete),
            _ => None,
        }
    }

    /// Name of the enum variant, used by the generator.
    pub fn variant_name(self) -> &'static str {
        match self {
            HttpVerb::Get => "Get",
            HttpVerb::Post => "Post",
            HttpVerb::Put => "Put",
            HttpVerb::Patch => "Patch",
            HttpVerb::Delete => "Delete",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// Body-field selector of a binding.
///
/// Serialized as an optional string: absent means `None`, `"*"` means the whole
/// request, anything else names a top-level request field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum BodySelector {
    /// No body; non-path fields come from the query string.
    #[default]
    None,
    /// The whole request message is the body.
    Whole,
    /// One request field is the body.
    Field(String),
}

impl BodySelector {
    /// The named body field, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            BodySelector::Field(name) => Some(name),
            _ => None,
        }
    }

    pub fn has_body(&self) -> bool {
        !matches!(self, BodySelector::None)
    }
}

impl From<Option<String>> for BodySelector {
    fn from(value: Option<String>) -> Self {
        match value {
            None => BodySelector::None,
            Some(s) if s.is_empty() => BodySelector::None,
            Some(s) if s == "*" => BodySelector::Whole,
            Some(s) => BodySelector::Field(s),
        }
    }
}

impl From<BodySelector> for Option<String> {
    fn from(value: BodySelector) -> Self {
        match value {
            BodySelector::None => None,
            BodySelector::Whole => Some("*".to_string()),
            BodySelector::Field(name) => Some(name),
        }
    }
}

/// A message type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageDescriptor {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A message field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldDescriptor {
    /// Field name in snake_case; also its JSON key.
    pub name: String,

    /// Field type.
    #[serde(rename = "type")]
    pub ty: FieldType,

    /// Repeated (list) field.
    #[serde(default)]
    pub repeated: bool,

    /// Explicitly nullable field.
    #[serde(default)]
    pub optional: bool,
}

/// Field type: a scalar or a reference to a message/enum by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Named(String),
}

impl FieldType {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldType::Named(_))
    }

    pub fn is_64_bit(&self) -> bool {
        matches!(self, FieldType::Int64 | FieldType::Uint64)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "bool" => FieldType::Bool,
            "int32" => FieldType::Int32,
            "int64" => FieldType::Int64,
            "uint32" => FieldType::Uint32,
            "uint64" => FieldType::Uint64,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "string" => FieldType::String,
            _ => FieldType::Named(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Named(name) => name,
            scalar => scalar.to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Bool => "bool",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Named(name) => name,
        };
        f.write_str(name)
    }
}

/// An enum type, serialized by value name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<String>,
}
