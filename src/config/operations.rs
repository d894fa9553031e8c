//! Config loading, validation, and credential lookup.

use super::model::{Config, DEFAULT_CONFIG_FILE, LlmConfig};
use crate::error::{PromptError, Result};
use std::path::Path;
use tracing::debug;

/// Providers with a client implementation.
const SUPPORTED_PROVIDERS: &[&str] = &["anthropic"];

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the config for a command.
    ///
    /// An explicit path must exist. Without one, `promptmill.yaml` in the
    /// working directory is used when present, otherwise defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    debug!(
                        path = %fallback.display(),
                        "resolve: using config from working directory"
                    );
                    Self::load(fallback)
                } else {
                    debug!("resolve: no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| PromptError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - the LLM section must pass [`LlmConfig::validate`]
    /// - `run.max_iterations` must be positive
    /// - `best_of_n.num_runs` must be positive
    pub fn validate(&self) -> Result<()> {
        self.llm.validate()?;

        if self.run.max_iterations == 0 {
            return Err(PromptError::UserError(
                "config validation failed: run.max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.best_of_n.num_runs == 0 {
            return Err(PromptError::UserError(
                "config validation failed: best_of_n.num_runs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl LlmConfig {
    /// Validate model parameters.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(PromptError::UserError(format!(
                "config validation failed: unknown provider '{}'. Supported: {}",
                self.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(PromptError::UserError(format!(
                "config validation failed: temperature must be between 0.0 and 1.0 (found {})",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(PromptError::UserError(format!(
                "config validation failed: top_p must be between 0.0 and 1.0 (found {})",
                self.top_p
            )));
        }

        if self.max_tokens == 0 {
            return Err(PromptError::UserError(
                "config validation failed: max_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Find the API key: the explicit value wins, then the configured
    /// environment variable. Empty values count as missing.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(PromptError::MissingCredential(format!(
                "pass --api-key or set the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}
