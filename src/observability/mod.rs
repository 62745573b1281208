//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / client stubs
//!     → logging.rs (tracing events, filtered by RUST_LOG or config)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! Per-request spans come from the `TraceLayer` installed by `http::server`.

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;
