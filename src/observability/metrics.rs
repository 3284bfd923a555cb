//! Metrics collection and exposition.
//!
//! # Metrics
//! - `data_api_requests_total` (counter): calls by side, resource, outcome
//! - `data_api_registered_handlers` (gauge): handlers currently registered

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus exporter on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one data API call.
pub fn record_request(side: &'static str, resource: &'static str, outcome: &'static str) {
    metrics::counter!(
        "data_api_requests_total",
        "side" => side,
        "resource" => resource,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_registered_handlers(count: usize) {
    metrics::gauge!("data_api_registered_handlers").set(count as f64);
}
