//! Generator driver.
//!
//! # Data Flow
//! ```text
//! ServiceDescriptor
//!     → validate.rs (types, bindings, ambiguity; all fatal)
//!     → messages.rs / client.rs / server.rs / module.rs (emission)
//!     → Vec<GeneratedFile> (in memory)
//!     → write_files (only after every service generated)
//! ```
//!
//! # Design Decisions
//! - `generate` is a pure function: no I/O, no clock, no hash-ordered
//!   iteration, so identical IR yields byte-identical output
//! - Emitted code refers to the runtime as `::rpc_http_bridge`

mod client;
mod messages;
mod module;
pub mod naming;
mod server;
pub mod validate;
pub mod writer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::descriptor::{IrError, ServiceDescriptor};
use crate::routing::CompileError;

pub use validate::{validate, Plan};

/// What to do with a method that has no HTTP binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingBindingPolicy {
    /// Leave the method out of the HTTP surface, with a warning.
    #[default]
    Skip,
    /// Abort generation.
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub missing_binding: MissingBindingPolicy,
    /// Generated clients reject unknown response fields.
    pub strict_decoding: bool,
}

impl From<&GeneratorConfig> for GeneratorOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            missing_binding: config.missing_binding,
            strict_decoding: config.strict_decoding,
        }
    }
}

/// One emitted source file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to load IR: {0}")]
    Ir(#[from] IrError),

    #[error("{kind} name {name:?} is not a valid identifier")]
    InvalidName { kind: &'static str, name: String },

    #[error("type {0:?} is declared more than once")]
    DuplicateType(String),

    #[error("enum {0:?} has no values")]
    EmptyEnum(String),

    #[error("{message}.{field} is declared more than once")]
    DuplicateField { message: String, field: String },

    #[error("{message}.{field}: {reason}")]
    InvalidField {
        message: String,
        field: String,
        reason: String,
    },

    #[error("message {0:?} contains itself through singular fields")]
    RecursiveMessage(String),

    #[error("{context} references unknown type {name:?}")]
    UnknownType { context: String, name: String },

    #[error("method {0:?} is declared more than once")]
    DuplicateMethod(String),

    #[error("method {service}.{method} has no HTTP binding")]
    MissingBinding { service: String, method: String },

    #[error("method {method}: {source}")]
    InvalidTemplate {
        method: String,
        #[source]
        source: CompileError,
    },

    #[error("method {method}: path variable {field:?}: {reason}")]
    PathField {
        method: String,
        field: String,
        reason: String,
    },

    #[error("method {method}: body field {field:?} does not exist on the request")]
    BodyField { method: String, field: String },

    #[error("method {method}: path variable {field:?} overlaps the body field")]
    PathBodyCollision { method: String, field: String },

    #[error("method {method}: response body field {field:?} does not exist on the response")]
    ResponseField { method: String, field: String },

    #[error("method {method}: {source}")]
    Ambiguous {
        method: String,
        #[source]
        source: CompileError,
    },

    #[error("services {first:?} and {second:?} both generate into {dir}/")]
    DuplicateService { first: String, second: String, dir: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Emit the Rust sources for one service.
///
/// Output lives under `<service_snake>/`: `mod.rs`, `messages.rs`,
/// `client.rs` and `server.rs`.
pub fn generate(service: &ServiceDescriptor, options: &GeneratorOptions) -> Result<Vec<GeneratedFile>, GenerateError> {
    let plan = validate(service, options)?;
    let dir = PathBuf::from(naming::snake_case(&service.name));

    Ok(vec![
        GeneratedFile {
            path: dir.join("mod.rs"),
            contents: module::emit(&plan),
        },
        GeneratedFile {
            path: dir.join("messages.rs"),
            contents: messages::emit(&plan),
        },
        GeneratedFile {
            path: dir.join("client.rs"),
            contents: client::emit(&plan, options),
        },
        GeneratedFile {
            path: dir.join("server.rs"),
            contents: server::emit(&plan),
        },
    ])
}

/// Generate every service, failing before any output exists.
pub fn generate_all(
    services: &[ServiceDescriptor],
    options: &GeneratorOptions,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mut dirs: BTreeMap<String, &str> = BTreeMap::new();
    for service in services {
        let dir = naming::snake_case(&service.name);
        if let Some(first) = dirs.insert(dir.clone(), &service.name) {
            return Err(GenerateError::DuplicateService {
                first: first.to_string(),
                second: service.name.clone(),
                dir,
            });
        }
    }

    let mut files = Vec::new();
    for service in services {
        files.extend(generate(service, options)?);
    }
    Ok(files)
}

/// Write generated files under `out_dir`, creating directories as needed.
pub fn write_files(out_dir: &Path, files: &[GeneratedFile]) -> Result<(), GenerateError> {
    for file in files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, &file.contents).map_err(|source| GenerateError::Io { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), bytes = file.contents.len(), "Wrote generated file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let config = GeneratorConfig {
            missing_binding: MissingBindingPolicy::Fail,
            strict_decoding: true,
        };
        let options = GeneratorOptions::from(&config);
        assert_eq!(options.missing_binding, MissingBindingPolicy::Fail);
        assert!(options.strict_decoding);
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: MissingBindingPolicy = serde_json::from_str(r#""fail""#).unwrap();
        assert_eq!(policy, MissingBindingPolicy::Fail);
        assert_eq!(serde_json::to_string(&MissingBindingPolicy::Skip).unwrap(), r#""skip""#);
    }
}
