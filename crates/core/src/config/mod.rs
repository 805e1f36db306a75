//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PIXGEN_*)
//! 2. TOML config file (`--config` or PIXGEN_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PIXGEN_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the image generation endpoint.
    ///
    /// Set via PIXGEN_ENDPOINT environment variable.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Value of the `improve` query parameter.
    #[serde(default = "default_true")]
    pub improve: bool,

    /// Value of the `format` query parameter.
    #[serde(default = "default_format")]
    pub format: String,

    /// Generation request timeout in milliseconds.
    ///
    /// Set via PIXGEN_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Quiet period before typed input triggers a generation.
    ///
    /// Set via PIXGEN_DEBOUNCE_MS environment variable.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of prompt → locator entries kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum image size accepted by the display.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory downloaded images are written to.
    ///
    /// Set via PIXGEN_DOWNLOAD_DIR environment variable.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_endpoint() -> String {
    "https://img.hazex.workers.dev/".into()
}

fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "square".into()
}

fn default_timeout_ms() -> u64 {
    12_000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_image_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_user_agent() -> String {
    "pixgen/0.1".into()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            improve: true,
            format: default_format(),
            timeout_ms: default_timeout_ms(),
            debounce_ms: default_debounce_ms(),
            cache_capacity: default_cache_capacity(),
            max_redirects: default_max_redirects(),
            max_image_bytes: default_max_image_bytes(),
            user_agent: default_user_agent(),
            download_dir: default_download_dir(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration, reading the TOML file named by `PIXGEN_CONFIG_FILE` if set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PIXGEN_CONFIG_FILE").ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PIXGEN_`
    /// 2. TOML file at `config_file` (if given)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(
            Env::prefixed("PIXGEN_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        tracing::debug!(endpoint = %config.endpoint, timeout_ms = config.timeout_ms, "configuration loaded");

        Ok(config)
    }
}
