//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fuse_queries_total` (counter): queries by breaker, outcome
//! - `fuse_transitions_total` (counter): trips/restores by breaker
//! - `fuse_probes_total` (counter): recovery probes by breaker, result
//! - `fuse_breaker_healthy` (gauge): 1=healthy, 0=tripped
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::breaker::Health;

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of one `query` call.
pub fn record_query(breaker: &str, outcome: &'static str) {
    metrics::counter!("fuse_queries_total", "breaker" => breaker.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record a health transition and update the health gauge.
pub fn record_transition(breaker: &str, to: Health) {
    metrics::counter!("fuse_transitions_total", "breaker" => breaker.to_string(), "to" => to.as_str())
        .increment(1);
    record_health(breaker, to);
}

pub fn record_health(breaker: &str, health: Health) {
    let value = match health {
        Health::Healthy => 1.0,
        Health::Tripped => 0.0,
    };
    metrics::gauge!("fuse_breaker_healthy", "breaker" => breaker.to_string()).set(value);
}

pub fn record_probe(breaker: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("fuse_probes_total", "breaker" => breaker.to_string(), "result" => result)
        .increment(1);
}
