//! CLI argument parsing for promptmill.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Promptmill: templated prompt tester and best-of-N evaluator.
///
/// A prompt template with `{{name}}` placeholders is combined with variable
/// definitions such as `topic="water", doc=$$dir(./docs)`. Every combination
/// of the iterating variables is rendered, sent to the model, and recorded
/// in a JSON session log.
#[derive(Parser, Debug)]
#[command(name = "promptmill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML config file (default: ./promptmill.yaml if present).
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for promptmill.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every combination and send each prompt to the model.
    ///
    /// Prints the variables, prompt and response for each combination and
    /// appends one session to the log.
    Run(RunArgs),

    /// Run one prompt several times, then ask the model to merge the results.
    ///
    /// Only the first combination of the initial variables is used. The
    /// evaluation template sees the outputs through `$$results(tag)` and the
    /// rendered prompt through `$$initial_prompt()`.
    BestOfN(BestOfNArgs),

    /// Show the rendered prompts without calling the model.
    Preview(PreviewArgs),
}

/// Where the prompt template and its variable definitions come from.
#[derive(Args, Debug, Clone, Default)]
pub struct TemplateArgs {
    /// Prompt template text.
    #[arg(long, conflicts_with = "template_file")]
    pub template: Option<String>,

    /// Read the prompt template from a file.
    #[arg(long, value_name = "PATH")]
    pub template_file: Option<PathBuf>,

    /// Variable definitions, e.g. `topic="water", n=$$list(["a","b"])`.
    #[arg(long, conflicts_with = "vars_file")]
    pub vars: Option<String>,

    /// Read the variable definitions from a file.
    #[arg(long, value_name = "PATH")]
    pub vars_file: Option<PathBuf>,
}

/// Per-invocation overrides of the `llm` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// Model identifier.
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 1.0).
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Maximum output tokens per response.
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling (0.0 to 1.0).
    #[arg(long)]
    pub top_p: Option<f64>,

    /// System prompt sent with every request.
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// API key. Takes precedence over the configured environment variable.
    #[arg(long)]
    pub api_key: Option<String>,
}

/// Session log destination.
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Session log path.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write to the log path as given, without a date and time suffix.
    #[arg(long)]
    pub no_log_timestamp: bool,
}

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub log: LogArgs,

    /// Maximum number of combinations to run.
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

/// Arguments for the `best-of-n` command.
#[derive(Args, Debug, Clone, Default)]
pub struct BestOfNArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub log: LogArgs,

    /// Evaluation template text.
    #[arg(long, conflicts_with = "eval_template_file")]
    pub eval_template: Option<String>,

    /// Read the evaluation template from a file.
    #[arg(long, value_name = "PATH")]
    pub eval_template_file: Option<PathBuf>,

    /// Evaluation variable definitions.
    #[arg(long, conflicts_with = "eval_vars_file")]
    pub eval_vars: Option<String>,

    /// Read the evaluation variable definitions from a file.
    #[arg(long, value_name = "PATH")]
    pub eval_vars_file: Option<PathBuf>,

    /// How many times to send the initial prompt.
    #[arg(short = 'n', long)]
    pub num_runs: Option<usize>,
}

/// Arguments for the `preview` command.
#[derive(Args, Debug, Clone, Default)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Maximum number of combinations to render.
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
