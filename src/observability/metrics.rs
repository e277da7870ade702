//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, status, class
//! - `dispatch_request_duration_seconds` (histogram): latency by class
//! - `dispatch_errors_total` (counter): handler errors by presentation
//! - `config_reloads_total` (counter): configuration changes by outcome
//!
//! Without an installed recorder every call is a no-op, so library code and
//! tests record unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, class: &'static str, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "class" => class,
    )
    .increment(1);
    histogram!("dispatch_request_duration_seconds", "class" => class)
        .record(start.elapsed().as_secs_f64());
}

/// Record how a handler error was presented (`redirect` or `structured`).
pub fn record_error(presentation: &'static str) {
    counter!("dispatch_errors_total", "presentation" => presentation).increment(1);
}

/// Record a configuration change attempt (`applied` or `rejected`).
pub fn record_config_reload(outcome: &'static str) {
    counter!("config_reloads_total", "outcome" => outcome).increment(1);
}
