//! Messages for `GreetingService`.
//!
//! Generated by rpc-http-gen. Do not edit.

use ::rpc_http_bridge::codec::{Cardinality, FieldKind, FieldSchema, Message, MessageSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SayHelloRequest {
    pub ping: String,
}

impl Message for SayHelloRequest {
    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema = MessageSchema {
            name: "SayHelloRequest",
            fields: &[FieldSchema::new("ping", FieldKind::String, Cardinality::Singular)],
        };
        &SCHEMA
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SayHelloResponse {
    pub pong: String,
}

impl Message for SayHelloResponse {
    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema = MessageSchema {
            name: "SayHelloResponse",
            fields: &[FieldSchema::new("pong", FieldKind::String, Cardinality::Singular)],
        };
        &SCHEMA
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetRequest {
    pub name: String,
    pub title: Option<String>,
}

impl Message for GreetRequest {
    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema = MessageSchema {
            name: "GreetRequest",
            fields: &[
                FieldSchema::new("name", FieldKind::String, Cardinality::Singular),
                FieldSchema::new("title", FieldKind::String, Cardinality::Optional),
            ],
        };
        &SCHEMA
    }
}
