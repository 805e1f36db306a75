//! Client code for pixgen.
//!
//! This crate provides the HTTP collaborators of the request controller: the
//! generation endpoint client and the image display that loads and saves
//! results.

pub mod display;
pub mod generate;

#[cfg(test)]
mod testing;

pub use display::{HttpImageDisplay, ImageDisplay, ImageSaver, LoadedImage};
pub use generate::{GenerationRequest, ImageClient, ImageClientConfig, LocatorSource};
