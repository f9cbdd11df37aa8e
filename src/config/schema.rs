//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! application shell and the review backend. All types derive Serde traits
//! for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::host::ROOT_SELECTOR;
use crate::routing::DEFAULT_TITLE;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Interactive shell (router host) settings.
    pub shell: ShellConfig,

    /// Review client settings used by the shell and CLI.
    pub review: ReviewConfig,

    /// Review backend listener settings.
    pub server: ServerConfig,

    /// Request limits on the backend query and submission routes.
    pub limits: LimitsConfig,

    /// Report database.
    pub storage: StorageConfig,

    /// Upstream models the backend can query.
    pub models: Vec<ModelConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Selector of the root container the application mounts into.
    pub root_selector: String,

    /// Path navigated to at startup.
    pub start_path: String,

    /// Title for routes without one.
    pub default_title: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            root_selector: ROOT_SELECTOR.to_string(),
            start_path: "/".to_string(),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Review client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base URL of the review backend.
    pub endpoint: String,

    /// Model name sent with each query.
    pub model: String,

    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum attempts including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            model: "default".to_string(),
            timeout_secs: 120,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Review backend listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Total time allowed for one request in seconds.
    pub request_timeout_secs: u64,

    /// Timeout for the upstream model call in seconds.
    pub upstream_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 180,
            upstream_timeout_secs: 150,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Per-client request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Enable rate limiting on query and submission routes.
    pub enabled: bool,

    /// Query requests per client IP per hour.
    pub query_per_hour: u32,

    /// Report submissions per client IP per hour.
    pub submit_per_hour: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            query_per_hour: 300,
            submit_per_hour: 60,
        }
    }
}

/// Report database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite URL, e.g. "sqlite://report_database.db" or "sqlite::memory:".
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://report_database.db".to_string(),
        }
    }
}

/// One upstream model, OpenAI-compatible.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ModelConfig {
    /// Name clients select the model by.
    pub name: String,

    /// Model identifier sent upstream.
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    /// API base URL, e.g. "https://api.example.com/v1".
    #[serde(default)]
    pub base_url: String,

    /// Force JSON response format on or off; unset means "when the prompt
    /// mentions json".
    #[serde(default)]
    pub json_format: Option<bool>,
}

impl ModelConfig {
    /// A model is offered to clients only with credentials and an endpoint.
    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or filter directive.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl AppConfig {
    /// Models that have both credentials and an endpoint.
    pub fn available_models(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.iter().filter(|m| m.is_available())
    }
}
