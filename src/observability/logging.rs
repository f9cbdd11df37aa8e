//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Honor `RUST_LOG`, falling back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Human-readable fmt layer; fields carry path, view, model, request id

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor config say otherwise.
pub const DEFAULT_FILTER: &str = "report_review=info,tower_http=info";

/// Install the global subscriber.
///
/// `level` is a bare level (`debug`) or a full filter directive.
pub fn init(level: &str) {
    let fallback = filter_for(level);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Expand a bare level into a crate-scoped directive.
pub fn filter_for(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("report_review={level},tower_http={level}")
    }
}
