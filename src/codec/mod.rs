//! Payload codec.
//!
//! # Data Flow
//! ```text
//! Server:  path params + query + body bytes → decode.rs → typed request
//!          typed response → encode.rs → JSON body
//!
//! Client:  typed request → encode.rs → path segments + query + body
//!          JSON body → decode.rs → typed response
//! ```
//!
//! Every direction is driven by the `MessageSchema` a generated message
//! exposes through the `Message` trait (schema.rs). 64-bit integers cross the
//! JSON boundary through int64.rs.

pub mod decode;
pub mod encode;
pub mod int64;
pub mod schema;

pub use decode::{decode_request, decode_response, DecodeError, DecodeOptions};
pub use encode::{encode_request, encode_response, EncodeError, EncodedRequest};
pub use schema::{Cardinality, FieldKind, FieldPath, FieldSchema, Message, MessageSchema};
