//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bff_frontend_resolutions_total` (counter): resolutions by outcome
//!   (`matched`, `default`, `none`, `empty`)
//! - `bff_path_case_mismatches_total` (counter): frontends missed only
//!   because of path case
//! - `bff_registry_frontends` (gauge): registered frontends
//! - `bff_default_conflicts_total` (counter): shadowed default registrations
//! - `bff_cache_invalidations_total` (counter): by cache and outcome
//! - `bff_invalidation_events_dropped_total` (counter): by reason
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, which keeps unit tests exporter-free

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("bff_frontend_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_path_case_mismatch() {
    metrics::counter!("bff_path_case_mismatches_total").increment(1);
}

pub fn record_registry_size(count: usize) {
    metrics::gauge!("bff_registry_frontends").set(count as f64);
}

pub fn record_default_conflict() {
    metrics::counter!("bff_default_conflicts_total").increment(1);
}

pub fn record_invalidation(cache: &'static str, outcome: &'static str) {
    metrics::counter!("bff_cache_invalidations_total", "cache" => cache, "outcome" => outcome).increment(1);
}

pub fn record_invalidation_dropped(reason: &'static str) {
    metrics::counter!("bff_invalidation_events_dropped_total", "reason" => reason).increment(1);
}
