//! Presentation seam between the controller and the terminal.

use std::io::Write;

use pixgen_core::{GenerationState, Reveal};
use serde::Serialize;

/// Receives every state change of the controller.
pub trait Renderer: Send {
    fn render(&mut self, state: &GenerationState);

    /// Called after a successful load, once the image is shown.
    fn reveal(&mut self) {}
}

/// Output style of the terminal renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct RevealEvent {
    reveal: Reveal,
}

/// Writes one line per state change.
pub struct TerminalRenderer<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::warn!("failed to write output: {e}");
        }
    }

    fn text_line(state: &GenerationState) -> String {
        match state {
            GenerationState::Idle => "· idle".to_string(),
            GenerationState::Loading => "… generating".to_string(),
            GenerationState::Success(locator) => format!("✓ {locator}"),
            GenerationState::Error(message) => format!("✗ {message}"),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, state: &GenerationState) {
        let line = match self.format {
            OutputFormat::Text => Self::text_line(state),
            OutputFormat::Json => serde_json::to_string(&state.view()).unwrap_or_default(),
        };
        self.write_line(&line);
    }

    fn reveal(&mut self) {
        if self.format == OutputFormat::Json {
            let line = serde_json::to_string(&RevealEvent { reveal: Reveal::SHOWN }).unwrap_or_default();
            self.write_line(&line);
        }
    }
}
