//! Metrics collection and exposition.
//!
//! # Metrics
//! - `review_navigations_total` (counter): navigations by view and outcome
//!   (`matched`, `fallback`, `superseded`, `failed`)
//! - `review_backend_queries_total` (counter): backend queries by route, status
//! - `review_backend_query_duration_seconds` (histogram): backend latency
//! - `review_rate_limited_total` (counter): rejected by the rate limiter
//! - `review_client_attempts_total` (counter): review client attempts by outcome
//! - `review_reports_saved_total` (counter): report submissions by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus listener only when enabled in config

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::views::ViewId;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_navigation(view: ViewId, outcome: &'static str) {
    counter!("review_navigations_total", "view" => view.as_str(), "outcome" => outcome).increment(1);
}

pub fn record_query(route: &'static str, status: u16, start: Instant) {
    counter!("review_backend_queries_total", "route" => route, "status" => status.to_string())
        .increment(1);
    histogram!("review_backend_query_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(route: &'static str) {
    counter!("review_rate_limited_total", "route" => route).increment(1);
}

pub fn record_review_attempt(outcome: &'static str) {
    counter!("review_client_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_report_saved(outcome: &'static str) {
    counter!("review_reports_saved_total", "outcome" => outcome).increment(1);
}
