//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_status_checks_total` (counter): verification cycles by outcome
//! - `gate_explorer_requests_total` (counter): explorer calls by endpoint, result
//! - `gate_explorer_request_duration_seconds` (histogram): explorer latency
//! - `gate_state_writes_total` (counter): state file writes by result
//! - `gate_downloads_total` (counter): download attempts by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one verification cycle.
pub fn record_status_check(outcome: &'static str) {
    counter!("gate_status_checks_total", "outcome" => outcome).increment(1);
}

/// Record one explorer call.
pub fn record_explorer_request(endpoint: &'static str, success: bool, start: Instant) {
    let result = if success { "ok" } else { "error" };
    counter!("gate_explorer_requests_total", "endpoint" => endpoint, "result" => result).increment(1);
    histogram!("gate_explorer_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a persisted state write.
pub fn record_state_write(success: bool) {
    let result = if success { "ok" } else { "error" };
    counter!("gate_state_writes_total", "result" => result).increment(1);
}

/// Record a download attempt.
pub fn record_download(result: &'static str) {
    counter!("gate_downloads_total", "result" => result).increment(1);
}
