//! Report review: table-driven view router for the review application shell,
//! plus the LLM review backend it talks to.

pub mod config;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod review;
pub mod routing;
pub mod security;
pub mod storage;
pub mod views;

pub use config::AppConfig;
pub use http::ReviewServer;
pub use lifecycle::{bootstrap, App, Shutdown, StartupError};
pub use routing::{Dispatcher, NavigationOutcome, NavigationState, Navigator};
pub use storage::ReportStore;
