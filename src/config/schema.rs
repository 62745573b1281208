//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so an empty file is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use crate::codegen::MissingBindingPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Where the HTTP server listens.
    pub listener: ListenerConfig,

    /// Dispatcher limits and defaults.
    pub server: ServerConfig,

    /// Code generation policy.
    pub generator: GeneratorConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Deadline applied when a request has no `grpc-timeout` header. 0 = none.
    pub default_timeout_ms: u64,

    /// Largest accepted request body in bytes.
    pub max_body_size: usize,

    /// Reject unknown JSON fields and query keys.
    pub strict_decoding: bool,

    /// How long in-flight requests may drain after shutdown starts.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 0,
            max_body_size: 4 * 1024 * 1024,
            strict_decoding: false,
            shutdown_grace_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// What to do with methods that have no HTTP binding.
    pub missing_binding: MissingBindingPolicy,

    /// Whether generated clients decode responses strictly.
    pub strict_decoding: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// "pretty" or "compact".
    pub log_format: String,

    pub metrics_enabled: bool,

    /// Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
