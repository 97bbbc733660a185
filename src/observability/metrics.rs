//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_listener_requests_total` (counter): dispatched requests by method, status
//! - `http_listener_dispatch_duration_seconds` (histogram): handler latency by method
//! - `http_listener_documents_served_total` (counter): documentation hits by document
//! - `http_listener_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exposition is optional and bound to its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "http_listener_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_listener_dispatch_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one served documentation resource.
pub fn record_document_served(document: &str) {
    metrics::counter!("http_listener_documents_served_total", "document" => document.to_string()).increment(1);
}

pub fn record_active_connections(count: u64) {
    metrics::gauge!("http_listener_active_connections").set(count as f64);
}
