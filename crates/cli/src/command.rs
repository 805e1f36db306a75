//! User actions dispatched into the controller.

use std::str::FromStr;

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The prompt text changed.
    InputChanged(String),
    /// Enter pressed.
    Submit,
    Regenerate,
    Download,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown command: /{0} (try /submit, /regen, /download, /quit)")]
pub struct UnknownCommand(String);

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Parse one line of interactive input.
    ///
    /// Lines starting with `/` are actions; anything else replaces the prompt text.
    /// A literal leading slash can be typed as `//`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(action) = line.strip_prefix('/') else {
            return Ok(Command::InputChanged(line.to_string()));
        };

        if action.starts_with('/') {
            return Ok(Command::InputChanged(action.to_string()));
        }

        match action.trim() {
            "submit" | "enter" | "go" => Ok(Command::Submit),
            "regen" | "regenerate" => Ok(Command::Regenerate),
            "download" | "save" => Ok(Command::Download),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}
