//! Command implementations for promptmill.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the input loading and console formatting the
//! commands share.

mod best_of_n;
mod preview;
mod run;

use crate::cli::{Cli, Command, LlmArgs, LogArgs, TemplateArgs};
use crate::config::{Config, LlmConfig};
use crate::error::{PromptError, Result};
use crate::llm::AnthropicClient;
use crate::session::timestamped_log_path;
use crate::vars::{BindingValue, Combination, PATH_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longest value shown in full when listing a combination.
const DISPLAY_LIMIT: usize = 100;

/// Dispatch a command to its implementation.
///
/// Config is resolved once here; each command applies its own overrides.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => run::cmd_run(args, config),
        Command::BestOfN(args) => best_of_n::cmd_best_of_n(args, config),
        Command::Preview(args) => preview::cmd_preview(args, config),
    }
}

/// Template and definitions text for one stage.
#[derive(Debug)]
struct StageInput {
    template: String,
    definitions: String,
}

/// Read the template and definitions named by `args`.
///
/// A template is required; definitions default to none.
fn load_stage_input(args: &TemplateArgs) -> Result<StageInput> {
    let template = read_text_source(
        args.template.as_deref(),
        args.template_file.as_deref(),
        "template",
    )?
    .ok_or_else(|| {
        PromptError::UserError(
            "a template is required: pass --template or --template-file".to_string(),
        )
    })?;

    if template.trim().is_empty() {
        return Err(PromptError::UserError("template must not be empty".to_string()));
    }

    let definitions =
        read_text_source(args.vars.as_deref(), args.vars_file.as_deref(), "variables")?
            .unwrap_or_default();

    Ok(StageInput { template, definitions })
}

/// Inline text wins over a file; neither yields `None`.
fn read_text_source(
    inline: Option<&str>,
    file: Option<&Path>,
    what: &str,
) -> Result<Option<String>> {
    if let Some(text) = inline {
        return Ok(Some(text.to_string()));
    }

    match file {
        Some(path) => {
            debug!(path = %path.display(), what, "read_text_source: reading file");
            fs::read_to_string(path).map(Some).map_err(|e| {
                PromptError::UserError(format!(
                    "failed to read {} file '{}': {}",
                    what,
                    path.display(),
                    e
                ))
            })
        }
        None => Ok(None),
    }
}

/// Apply command-line overrides to the model section and re-check it.
fn apply_llm_overrides(llm: &mut LlmConfig, args: &LlmArgs) -> Result<()> {
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        llm.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        llm.max_tokens = max_tokens;
    }
    if let Some(top_p) = args.top_p {
        llm.top_p = top_p;
    }
    if let Some(system_prompt) = &args.system_prompt {
        llm.system_prompt = system_prompt.clone();
    }
    llm.validate()
}

/// Build the HTTP client for the configured provider.
fn build_client(llm: &LlmConfig, api_key: String) -> Result<AnthropicClient> {
    AnthropicClient::new(llm, api_key)
        .map_err(|e| PromptError::UserError(format!("failed to initialise model client: {}", e)))
}

/// The log path for this invocation.
fn resolve_log_path(args: &LogArgs, configured: &str, append_timestamp: bool) -> PathBuf {
    let base = args
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(configured));
    timestamped_log_path(&base, append_timestamp && !args.no_log_timestamp)
}

/// Keep at most `max` combinations, warning when some are dropped.
fn limit_combinations(
    mut combinations: Vec<Combination>,
    max: usize,
) -> (Vec<Combination>, Option<String>) {
    if combinations.len() <= max {
        return (combinations, None);
    }

    let warning = format!(
        "Found {} possible combinations. Limiting to {} as configured.",
        combinations.len(),
        max
    );
    combinations.truncate(max);
    (combinations, Some(warning))
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}

/// Shorten long values for console display.
fn display_value(value: &str) -> String {
    match value.char_indices().nth(DISPLAY_LIMIT) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// List the bindings of a combination; `_path` entries are shown verbatim.
fn print_combination(combination: &Combination) {
    println!("Variables:");
    for (name, value) in combination.iter() {
        let shown = match value {
            BindingValue::Text(text) if name.ends_with(PATH_SUFFIX) => text.clone(),
            BindingValue::Text(text) => display_value(text),
            BindingValue::Deferred(_) => "(resolved during evaluation)".to_string(),
        };
        println!("  {}: {}", name, shown);
    }
}

fn print_section(title: &str, body: &str) {
    println!("\n--- {} ---", title);
    println!("{}", body);
}
