//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, target
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_attacks_total` (counter): applied attacks by type
//! - `gateway_observers` (gauge): connected audit-stream observers
//!
//! # Design Decisions
//! - Exposition is opt-in; recording macros are no-ops without an
//!   installed recorder, so call sites never branch on configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use thiserror::Error;

use crate::config::ObservabilityConfig;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("METRICS_ADDRESS is not a socket address: {0}")]
    InvalidAddress(String),

    #[error("failed to install prometheus exporter: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}

/// Install the Prometheus exporter if metrics are enabled.
pub fn init(config: &ObservabilityConfig) -> Result<(), MetricsError> {
    if !config.metrics_enabled {
        return Ok(());
    }

    let address: SocketAddr = config
        .metrics_address
        .parse()
        .map_err(|_| MetricsError::InvalidAddress(config.metrics_address.clone()))?;

    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    tracing::info!(address = %address, "prometheus exporter listening");
    Ok(())
}

/// Record the outcome of a forwarded request.
pub fn record_request(method: &str, status: u16, target: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "target" => target.to_string(),
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an applied attack.
pub fn record_attack(attack_type: &str) {
    counter!("gateway_attacks_total", "type" => attack_type.to_string()).increment(1);
}

/// Track the audit-stream observer count.
pub fn set_observers(count: usize) {
    gauge!("gateway_observers").set(count as f64);
}
