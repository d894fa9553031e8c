//! Configuration model for promptmill.
//!
//! This module defines the Config struct that represents `promptmill.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.
//! Command-line flags override the file.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{BestOfNConfig, Config, DEFAULT_CONFIG_FILE, LlmConfig, RunConfig};
