//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming query request:
//!     → rate_limit.rs (per-IP hourly quota)
//!     → Pass to handler, or 429
//! ```

pub mod rate_limit;

pub use rate_limit::{RateLimiter, RATE_LIMITED_MESSAGE};
