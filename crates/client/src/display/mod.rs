//! Image display and saving.
//!
//! The display loads a result locator and holds the image bytes of the last
//! successful load, which is what a download writes to disk.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use pixgen_core::{AppConfig, Error};
use reqwest::header;
use tokio::sync::RwLock;

/// Loads a locator and signals success or failure exactly once.
#[async_trait::async_trait]
pub trait ImageDisplay: Send + Sync {
    async fn load(&self, locator: &str) -> Result<(), Error>;
}

/// Saves the image behind a locator to a local file.
#[async_trait::async_trait]
pub trait ImageSaver: Send + Sync {
    async fn save(&self, locator: &str, destination: &Path) -> Result<(), Error>;
}

/// Image held by the display after a successful load.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub locator: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Display that downloads the image over HTTP and keeps it in memory.
pub struct HttpImageDisplay {
    http: reqwest::Client,
    max_bytes: usize,
    current: RwLock<Option<LoadedImage>>,
}

impl HttpImageDisplay {
    pub fn new(timeout: Duration, user_agent: &str, max_bytes: usize) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, max_bytes, current: RwLock::new(None) })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(config.timeout(), &config.user_agent, config.max_image_bytes)
    }

    /// The image from the most recent successful load.
    pub async fn current(&self) -> Option<LoadedImage> {
        self.current.read().await.clone()
    }

    async fn fetch_image(&self, locator: &str) -> Result<LoadedImage, String> {
        let response = self.http.get(locator).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ct) = &content_type
            && !accepts_content_type(ct)
        {
            return Err(format!("unexpected content type {ct}"));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.max_bytes
        {
            return Err(format!("{} bytes exceeds {}", len, self.max_bytes));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;

        if bytes.is_empty() {
            return Err("empty body".to_string());
        }
        if bytes.len() > self.max_bytes {
            return Err(format!("{} bytes exceeds {}", bytes.len(), self.max_bytes));
        }

        Ok(LoadedImage { locator: locator.to_string(), content_type, bytes })
    }
}

/// Image types, plus untyped binary bodies that a browser would sniff.
fn accepts_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence.starts_with("image/") || essence == "application/octet-stream"
}

#[async_trait::async_trait]
impl ImageDisplay for HttpImageDisplay {
    async fn load(&self, locator: &str) -> Result<(), Error> {
        match self.fetch_image(locator).await {
            Ok(image) => {
                tracing::debug!(%locator, bytes = image.bytes.len(), "image loaded");
                *self.current.write().await = Some(image);
                Ok(())
            }
            Err(reason) => {
                tracing::warn!(%locator, %reason, "image failed to load");
                Err(Error::DisplayLoad)
            }
        }
    }
}

#[async_trait::async_trait]
impl ImageSaver for HttpImageDisplay {
    async fn save(&self, locator: &str, destination: &Path) -> Result<(), Error> {
        let held = self.current.read().await.clone().filter(|image| image.locator == locator);
        let image = match held {
            Some(image) => image,
            None => self.fetch_image(locator).await.map_err(Error::Save)?,
        };

        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Save(e.to_string()))?;
        }

        tokio::fs::write(destination, &image.bytes)
            .await
            .map_err(|e| Error::Save(e.to_string()))?;

        tracing::info!(path = %destination.display(), bytes = image.bytes.len(), "image saved");
        Ok(())
    }
}
