//! Client metrics.
//!
//! # Metrics
//! - `matrix_client_requests_total` (counter): responses by method, status
//! - `matrix_client_request_duration_seconds` (histogram): round-trip latency
//! - `matrix_client_transport_errors_total` (counter): requests that got no response
//! - `matrix_client_rate_limited_total` (counter): 429s by policy decision
//! - `matrix_client_discovery_candidates_total` (counter): tried candidates by kind, outcome
//!
//! # Design Decisions
//! - The library only records; installing a recorder/exporter is up to the application
//! - Without a recorder every call is a no-op

use std::time::Instant;

use metrics::{counter, histogram};

pub fn record_request(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    counter!(
        "matrix_client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "matrix_client_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(elapsed);
}

pub fn record_transport_error(method: &str) {
    counter!(
        "matrix_client_transport_errors_total",
        "method" => method.to_string()
    )
    .increment(1);
}

pub fn record_rate_limited(decision: &'static str) {
    counter!("matrix_client_rate_limited_total", "decision" => decision).increment(1);
}

pub fn record_discovery_candidate(kind: &'static str, accepted: bool) {
    counter!(
        "matrix_client_discovery_candidates_total",
        "kind" => kind,
        "accepted" => if accepted { "true" } else { "false" }
    )
    .increment(1);
}
