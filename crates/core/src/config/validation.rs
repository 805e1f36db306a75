//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field: field.into(), reason: reason.into() }
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `endpoint` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `debounce_ms` exceeds 10 seconds
    /// - `cache_capacity` is 0 or exceeds 1000
    /// - `max_image_bytes` is 0 or exceeds 50MB
    /// - `format` or `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| ConfigError::invalid("endpoint", e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::invalid("endpoint", format!("unsupported scheme: {}", endpoint.scheme())));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.debounce_ms > 10_000 {
            return Err(ConfigError::invalid("debounce_ms", "must not exceed 10 seconds (10000ms)"));
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::invalid("cache_capacity", "must be greater than 0"));
        }
        if self.cache_capacity > 1000 {
            return Err(ConfigError::invalid("cache_capacity", "must not exceed 1000"));
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::invalid("max_image_bytes", "must be greater than 0"));
        }
        if self.max_image_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::invalid("max_image_bytes", "must not exceed 50MB"));
        }

        if self.format.trim().is_empty() {
            return Err(ConfigError::invalid("format", "must not be empty"));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        if self.debounce_ms == 0 {
            tracing::warn!("debounce_ms is 0; every input change triggers a generation attempt");
        }

        Ok(())
    }
}
