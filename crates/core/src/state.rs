//! Generation state machine and its presentation mapping.
//!
//! The controller owns a [`GenerationState`]; renderers turn it into a
//! [`ViewState`] describing which widgets are visible.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of the current generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum GenerationState {
    #[default]
    Idle,
    Loading,
    /// Image displayed; carries its locator.
    Success(String),
    Error(String),
}

impl GenerationState {
    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::Success(locator) => Some(locator),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }

    /// Widget visibility for this state.
    pub fn view(&self) -> ViewState {
        let (spinner, image, buttons, error) = match self {
            Self::Loading => (true, false, false, false),
            Self::Success(_) => (false, true, true, false),
            Self::Error(_) => (false, false, false, true),
            Self::Idle => (false, false, false, false),
        };

        ViewState {
            state: self.name(),
            spinner,
            image,
            buttons,
            error,
            image_locator: self.locator().map(str::to_string),
            error_message: self.error_message().map(str::to_string),
            reveal: if image { None } else { Some(Reveal::HIDDEN) },
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(locator) => write!(f, "success: {locator}"),
            Self::Error(message) => write!(f, "error: {message}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Opacity and scale of the image element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reveal {
    pub opacity: f32,
    pub scale: f32,
}

impl Reveal {
    /// Reset applied whenever the image is hidden.
    pub const HIDDEN: Reveal = Reveal { opacity: 0.0, scale: 0.95 };
    /// Target of the reveal animation after a successful load.
    pub const SHOWN: Reveal = Reveal { opacity: 1.0, scale: 1.0 };
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub state: &'static str,
    pub spinner: bool,
    pub image: bool,
    pub buttons: bool,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Forced reveal values; `None` leaves the element as it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<Reveal>,
}

/// File name used when saving the displayed image.
pub fn download_file_name(now: DateTime<Utc>) -> String {
    format!("image_{}.png", now.timestamp_millis())
}
