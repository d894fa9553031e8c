//! Implementation of the `promptmill run` command.
//!
//! Renders every combination of the variable definitions, sends each prompt
//! to the model in order, and appends one `template_test` session to the
//! log once all calls have finished.

use super::{
    StageInput, apply_llm_overrides, build_client, limit_combinations, load_stage_input,
    print_combination, print_section, print_warnings, resolve_log_path,
};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{PromptError, Result};
use crate::llm::{CompletionRequest, LlmClient, call_or_error};
use crate::prompt::render_template;
use crate::session::{LlmParameters, Session, SessionMode, StageRecord, record_session};
use crate::vars::{expand, parse_definitions};
use tracing::{debug, info};

/// Execute the `promptmill run` command.
pub fn cmd_run(args: RunArgs, mut config: Config) -> Result<()> {
    // The credential is checked before anything is read or rendered.
    let api_key = config.llm.resolve_api_key(args.llm.api_key.as_deref())?;
    apply_run_overrides(&args, &mut config)?;

    let client = build_client(&config.llm, api_key)?;
    run_with_client(&args, &config, &client)
}

/// Apply command-line overrides for `run` and re-validate.
fn apply_run_overrides(args: &RunArgs, config: &mut Config) -> Result<()> {
    apply_llm_overrides(&mut config.llm, &args.llm)?;
    if let Some(max) = args.max_iterations {
        config.run.max_iterations = max;
    }
    config.validate()
}

/// Everything after client construction; tests drive this with a mock client.
fn run_with_client(args: &RunArgs, config: &Config, client: &dyn LlmClient) -> Result<()> {
    let StageInput { template, definitions } = load_stage_input(&args.template)?;

    let defs = parse_definitions(&definitions);
    let expansion = expand(&defs);
    print_warnings(&expansion.warnings);

    if expansion.combinations.is_empty() {
        return Err(PromptError::UserError("No valid combinations found".to_string()));
    }

    let (combinations, limit_warning) =
        limit_combinations(expansion.combinations, config.run.max_iterations);
    if let Some(warning) = limit_warning {
        print_warnings(&[warning]);
    }

    let total = combinations.len();
    debug!(total, "cmd_run: running combinations");

    let mut stage = StageRecord::new(template.clone(), defs);
    for (i, combination) in combinations.iter().enumerate() {
        println!("\n=== Combination {}/{} ===", i + 1, total);
        print_combination(combination);

        let prompt = render_template(&template, combination);
        print_section("Prompt", &prompt);

        let request = CompletionRequest::from_config(&config.llm, prompt.clone());
        let output = call_or_error(client, &request);
        print_section("Response", &output);

        stage.push_run(combination.path_entries(), prompt, output);
    }

    let session = Session::new(
        SessionMode::TemplateTest,
        LlmParameters::from_config(&config.llm).with_max_iterations(config.run.max_iterations),
        stage,
    );

    let log_path = resolve_log_path(&args.log, &config.run.log_file, config.run.append_timestamp);
    if let Some(warning) = record_session(&log_path, session)? {
        print_warnings(&[warning]);
    }

    info!(path = %log_path.display(), runs = total, "cmd_run: session logged");
    println!("\nResults logged to {}", log_path.display());
    Ok(())
}
