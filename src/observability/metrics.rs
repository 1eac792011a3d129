//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by outcome (`match`, `external_url`)
//! - `router_unhandled_route_total` (counter): fallbacks to the web view
//! - `router_table_builds_total` (counter): domain map builds and reloads
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter only in long-running mode

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_dispatch(outcome: &'static str) {
    metrics::counter!("router_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_unhandled_route() {
    metrics::counter!("router_unhandled_route_total").increment(1);
}

pub fn record_table_build() {
    metrics::counter!("router_table_builds_total").increment(1);
}
