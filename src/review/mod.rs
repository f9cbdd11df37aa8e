//! Review subsystem.
//!
//! # Data Flow
//! ```text
//! Shell / CLI:
//!     form.rs (委托表 text)
//!     → client.rs (POST /query with prompt.rs rubric, retries)
//!     → verdict.rs (fixed key set, 合法 or explanation)
//!
//! Backend:
//!     /query, /query_stream handlers
//!     → upstream.rs (OpenAI-compatible chat completion)
//!     → reply JSON, or NDJSON deltas
//! ```

pub mod client;
pub mod form;
pub mod prompt;
pub mod upstream;
pub mod verdict;

pub use client::{ReviewClient, ReviewError};
pub use form::ReportForm;
pub use upstream::{LlmClient, UpstreamError};
pub use verdict::{FieldVerdict, Verdict, PASS, VERDICT_KEYS};
