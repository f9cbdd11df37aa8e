//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → sections handed to the shell, review client and backend
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::AppConfig;
pub use schema::LimitsConfig;
pub use schema::ModelConfig;
pub use schema::ObservabilityConfig;
pub use schema::ReviewConfig;
pub use schema::ServerConfig;
pub use schema::ShellConfig;
pub use schema::StorageConfig;
