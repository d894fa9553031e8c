//! Config struct definitions and default implementations.

use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "promptmill.yaml";

/// Configuration for promptmill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model service settings shared by every command.
    pub llm: LlmConfig,

    /// Settings for `promptmill run`.
    pub run: RunConfig,

    /// Settings for `promptmill best-of-n`.
    pub best_of_n: BestOfNConfig,
}

/// Model service parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name. Only "anthropic" is supported.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature, 0.0 to 1.0.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum output tokens per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling, 0.0 to 1.0.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// System prompt; empty means none.
    #[serde(default)]
    pub system_prompt: String,

    /// HTTP timeout for a single request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            system_prompt: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Settings for the template tester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of combinations to send to the model.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Session log path.
    #[serde(default = "default_run_log_file")]
    pub log_file: String,

    /// Insert the current date and time into the log file name.
    #[serde(default = "default_true")]
    pub append_timestamp: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            log_file: default_run_log_file(),
            append_timestamp: true,
        }
    }
}

/// Settings for best-of-N evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BestOfNConfig {
    /// How many times the initial prompt is sent.
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,

    /// Session log path.
    #[serde(default = "default_best_of_n_log_file")]
    pub log_file: String,

    /// Insert the current date and time into the log file name.
    #[serde(default = "default_true")]
    pub append_timestamp: bool,

    /// Evaluation template used when none is given on the command line.
    #[serde(default = "default_eval_template")]
    pub eval_template: String,

    /// Evaluation definitions used when none are given on the command line.
    #[serde(default = "default_eval_vars")]
    pub eval_vars: String,
}

impl Default for BestOfNConfig {
    fn default() -> Self {
        Self {
            num_runs: default_num_runs(),
            log_file: default_best_of_n_log_file(),
            append_timestamp: true,
            eval_template: default_eval_template(),
            eval_vars: default_eval_vars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-3-7-sonnet-latest".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_p() -> f64 {
    1.0
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_max_iterations() -> usize {
    10
}

fn default_run_log_file() -> String {
    "logs/prompt_tests.json".to_string()
}

fn default_num_runs() -> usize {
    5
}

fn default_best_of_n_log_file() -> String {
    "logs/best_of_n_tests.json".to_string()
}

pub(super) fn default_eval_template() -> String {
    "For the following input prompt, evaluate the outputs and create a single output \
     that takes the strengths of each into one best output:\n\n\
     <InputPrompt>{{initial_prompt}}</InputPrompt>\n\n\
     {{outputs}}\n"
        .to_string()
}

pub(super) fn default_eval_vars() -> String {
    "outputs=$$results(Output), initial_prompt=$$initial_prompt()".to_string()
}
