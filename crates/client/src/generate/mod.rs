//! Image generation endpoint client.
//!
//! Turns a prompt into a result locator: the URL the endpoint finally serves
//! the image from.
//!
//! ### Endpoint
//!
//! - **Request**: `GET <base>?prompt=..&improve=true&format=square&random=<epoch-ms>`
//! - **Caching**: disabled at the transport level (`Cache-Control: no-store`).
//! - **Result**: the response URL after redirects; the body is never read.
//! - **Failures**: non-2xx → `Api { status }`, timeout → `Timeout`.

pub mod request;

pub use request::{GenerationRequest, encode_component};

use std::time::{Duration, Instant};

use chrono::Utc;
use pixgen_core::{AppConfig, Error, Prompt};
use reqwest::header;

/// Produces a result locator for a prompt.
#[async_trait::async_trait]
pub trait LocatorSource: Send + Sync {
    async fn fetch_locator(&self, prompt: &Prompt) -> Result<String, Error>;
}

/// Generation client configuration.
#[derive(Debug, Clone)]
pub struct ImageClientConfig {
    /// Endpoint base URL.
    pub base_url: String,
    pub improve: bool,
    pub format: String,
    /// Request timeout (default: 12s).
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for ImageClientConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ImageClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.endpoint.clone(),
            improve: config.improve,
            format: config.format.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
        }
    }
}

/// HTTP client for the generation endpoint.
#[derive(Debug, Clone)]
pub struct ImageClient {
    http: reqwest::Client,
    config: ImageClientConfig,
}

impl ImageClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ImageClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl LocatorSource for ImageClient {
    async fn fetch_locator(&self, prompt: &Prompt) -> Result<String, Error> {
        let start = Instant::now();
        let url = GenerationRequest::new(prompt, self.config.improve, &self.config.format, Utc::now())
            .to_url(&self.config.base_url)?;

        tracing::debug!(%url, "requesting image locator");

        let response = self
            .http
            .get(url)
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "generation endpoint returned an error");
            return Err(Error::Api { status: status.as_u16() });
        }

        let locator = response.url().to_string();
        tracing::debug!(%locator, elapsed = ?start.elapsed(), "image locator resolved");

        Ok(locator)
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::Timeout } else { Error::Network(err.to_string()) }
}
