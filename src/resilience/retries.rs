//! Retry classification for review requests.
//!
//! # Design Decisions
//! - Connection errors and timeouts are always retryable
//! - 429 and every 5xx are retryable; other statuses are final
//! - Reviews have no side effects, so POSTs may be retried

use reqwest::StatusCode;

/// Whether a failed attempt is worth repeating.
pub fn is_retryable(status: Option<StatusCode>, transport_error: bool) -> bool {
    if transport_error {
        return true;
    }
    match status {
        Some(StatusCode::TOO_MANY_REQUESTS) => true,
        Some(status) => status.is_server_error(),
        None => false,
    }
}
