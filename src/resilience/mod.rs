//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Review request to backend:
//!     → per-attempt timeout (reqwest client)
//!     → On failure: retries.rs (check if retryable)
//!     → backoff.rs (exponential delay with jitter) → next attempt
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Jittered backoff prevents thundering herd
//! - Attempts are bounded by config

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::is_retryable;
