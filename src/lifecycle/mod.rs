//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Root container → Route table → Dispatcher → Initial navigation
//!     → Navigation loop
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or quit → broadcast → server drains, navigation loop exits
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, App, StartupError};
