//! Core types and shared functionality for pixgen.
//!
//! This crate provides:
//! - Prompt validation
//! - The FIFO locator cache
//! - Generation state and its view mapping
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod prompt;
pub mod state;

pub use cache::FifoCache;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use prompt::Prompt;
pub use state::{GenerationState, Reveal, ViewState};
