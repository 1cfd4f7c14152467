#![allow(clippy::must_use_candidate)]

pub mod decoder;
mod env;
mod loader;

use serde::Deserialize;

pub use decoder::*;

/// Top-level middleware configuration
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Client-side decoder configuration
    #[serde(default)]
    pub decoder: DecoderConfig,
}
