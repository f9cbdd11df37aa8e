//! Review backend HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (add request ID)
//!     → security::rate_limit (query and submission routes)
//!     → handlers.rs (model lookup and upstream call, or report store)
//!     → JSON reply or NDJSON stream
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, ReviewServer};
