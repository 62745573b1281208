//! Service IR subsystem.
//!
//! # Data Flow
//! ```text
//! IR file (JSON/TOML, from the interface compiler)
//!     → loader.rs (parse & deserialize)
//!     → ServiceDescriptor (immutable)
//!     → codegen (validate & emit)
//! ```

pub mod loader;
pub mod types;

pub use loader::{load_ir, parse_json, parse_toml, IrError};
pub use types::{
    BodySelector, EnumDescriptor, FieldDescriptor, FieldType, HttpRule, HttpVerb,
    MessageDescriptor, MethodDescriptor, ServiceDescriptor,
};
