//! Prompt validation.

use std::fmt;

use serde::Serialize;

/// Minimum length of a trimmed prompt, in UTF-16 code units.
pub const MIN_PROMPT_CHARS: usize = 3;

/// A trimmed prompt that passed the length check.
///
/// Used as the cache key, so comparisons are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Prompt(String);

impl Prompt {
    /// Trim `raw` and accept it if it is at least [`MIN_PROMPT_CHARS`] long.
    ///
    /// Length is measured in UTF-16 code units, so a character outside the
    /// Basic Multilingual Plane counts twice.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (trimmed.encode_utf16().count() >= MIN_PROMPT_CHARS).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
