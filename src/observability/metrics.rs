//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_http_requests_total` (counter): dispatched requests by method, code
//! - `rpc_http_request_duration_seconds` (histogram): dispatch latency by method
//! - `rpc_http_client_calls_total` (counter): client stub calls by method, code
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::status::OutcomeCode;

pub const REQUESTS_TOTAL: &str = "rpc_http_requests_total";
pub const REQUEST_DURATION: &str = "rpc_http_request_duration_seconds";
pub const CLIENT_CALLS_TOTAL: &str = "rpc_http_client_calls_total";

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(REQUESTS_TOTAL, "Requests handled by the dispatcher");
            describe_histogram!(REQUEST_DURATION, Unit::Seconds, "Dispatch latency");
            describe_counter!(CLIENT_CALLS_TOTAL, "Calls issued by client stubs");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, code: OutcomeCode, start: Instant) {
    counter!(REQUESTS_TOTAL, "method" => method.to_string(), "code" => code.as_str()).increment(1);
    histogram!(REQUEST_DURATION, "method" => method.to_string()).record(start.elapsed().as_secs_f64());
}

/// Record one client stub call.
pub fn record_client_call(method: &str, code: OutcomeCode) {
    counter!(CLIENT_CALLS_TOTAL, "method" => method.to_string(), "code" => code.as_str()).increment(1);
}
