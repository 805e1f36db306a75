//! Generation endpoint request parameters.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use pixgen_core::{Error, Prompt};
use url::Url;

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query parameters for one generation call.
///
/// `random` is a cache-buster so every call reaches the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub improve: bool,
    pub format: String,
    pub random: i64,
}

impl GenerationRequest {
    pub fn new(prompt: &Prompt, improve: bool, format: &str, now: DateTime<Utc>) -> Self {
        Self { prompt: prompt.as_str().to_string(), improve, format: format.to_string(), random: now.timestamp_millis() }
    }

    /// Encoded query string, spaces as `%20`.
    pub fn query(&self) -> String {
        format!(
            "prompt={}&improve={}&format={}&random={}",
            encode_component(&self.prompt),
            self.improve,
            encode_component(&self.format),
            self.random
        )
    }

    /// Full request URL on top of `base`, keeping any query the base already has.
    pub fn to_url(&self, base: &str) -> Result<Url, Error> {
        let mut url = Url::parse(base).map_err(|e| Error::Unknown(format!("invalid endpoint {base}: {e}")))?;
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{}", self.query()),
            _ => self.query(),
        };
        url.set_query(Some(&query));
        Ok(url)
    }
}

/// Percent-encode a value the way `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
