//! Unified error types for pixgen.
//!
//! The `Display` output of each variant is the message shown in the error panel.

/// Fallback message for errors that carry no text.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Errors raised while generating, displaying or saving an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Prompt missing or shorter than three characters on generate.
    #[error("Prompt must be at least 3 characters")]
    PromptTooShort,

    /// Prompt missing on regenerate.
    #[error("Please enter a prompt")]
    PromptMissing,

    /// Download requested before any image was displayed.
    #[error("No image to download")]
    NothingToDownload,

    /// The generation request did not settle in time and was aborted.
    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response from the generation endpoint.
    #[error("API Error: {status}")]
    Api { status: u16 },

    /// The image behind the locator could not be loaded.
    #[error("Image failed to load")]
    DisplayLoad,

    /// Transport failure before a response arrived.
    #[error("{0}")]
    Network(String),

    /// Writing the image to disk failed.
    #[error("Failed to save image: {0}")]
    Save(String),

    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Message for the error panel, falling back when the error has no text.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() { FALLBACK_MESSAGE.to_string() } else { message }
    }

    /// Whether the error came from input checks rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::PromptTooShort | Error::PromptMissing | Error::NothingToDownload)
    }
}
