//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges
//! - Detect duplicate model names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("shell.start_path '{0}' must start with '/'")]
    RelativeStartPath(String),

    #[error("shell.root_selector must not be empty")]
    EmptyRootSelector,

    #[error("review.base_delay_ms ({base}) exceeds review.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("storage.database_url '{0}' is not a sqlite URL")]
    InvalidDatabaseUrl(String),

    #[error("model name must not be empty")]
    EmptyModelName,

    #[error("model '{0}' is defined more than once")]
    DuplicateModel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.shell.root_selector.trim().is_empty() {
        errors.push(ValidationError::EmptyRootSelector);
    }
    if !config.shell.start_path.starts_with('/') {
        errors.push(ValidationError::RelativeStartPath(config.shell.start_path.clone()));
    }

    check_url(&mut errors, "review.endpoint", &config.review.endpoint);
    check_positive(&mut errors, "review.timeout_secs", config.review.timeout_secs);
    check_positive(&mut errors, "review.max_attempts", config.review.max_attempts as u64);
    if config.review.base_delay_ms > config.review.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.review.base_delay_ms,
            max: config.review.max_delay_ms,
        });
    }

    check_address(&mut errors, "server.bind_address", &config.server.bind_address);
    check_positive(&mut errors, "server.request_timeout_secs", config.server.request_timeout_secs);
    check_positive(&mut errors, "server.upstream_timeout_secs", config.server.upstream_timeout_secs);
    check_positive(&mut errors, "server.max_body_size", config.server.max_body_size as u64);

    if config.limits.enabled {
        check_positive(&mut errors, "limits.query_per_hour", config.limits.query_per_hour as u64);
        check_positive(&mut errors, "limits.submit_per_hour", config.limits.submit_per_hour as u64);
    }

    if !config.storage.database_url.starts_with("sqlite:") {
        errors.push(ValidationError::InvalidDatabaseUrl(
            config.storage.database_url.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for model in &config.models {
        if model.name.trim().is_empty() {
            errors.push(ValidationError::EmptyModelName);
        } else if !seen.insert(model.name.as_str()) {
            errors.push(ValidationError::DuplicateModel(model.name.clone()));
        }
        if !model.base_url.is_empty() {
            check_url(&mut errors, "models.base_url", &model.base_url);
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let ok = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ModelConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.shell.start_path = "upload".into();
        config.review.endpoint = "ftp://nowhere".into();
        config.review.max_attempts = 0;
        config.server.bind_address = "not-an-address".into();
        config.storage.database_url = "postgres://db".into();
        config.models = vec![
            ModelConfig {
                name: "qwen".into(),
                ..Default::default()
            },
            ModelConfig {
                name: "qwen".into(),
                base_url: "::".into(),
                ..Default::default()
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::InvalidDatabaseUrl("postgres://db".into())));
        assert!(errors.contains(&ValidationError::RelativeStartPath("upload".into())));
        assert!(errors.contains(&ValidationError::DuplicateModel("qwen".into())));
        assert!(errors.contains(&ValidationError::Zero {
            field: "review.max_attempts"
        }));
    }
}
