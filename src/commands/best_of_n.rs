//! Implementation of the `promptmill best-of-n` command.
//!
//! The first combination of the initial variables is rendered once and sent
//! `num_runs` times. The evaluation template is then rendered, its
//! `$$results` and `$$initial_prompt` references are filled in from those
//! runs, and one more call produces the merged answer.

use super::{
    StageInput, apply_llm_overrides, build_client, load_stage_input, print_combination,
    print_section, print_warnings, read_text_source, resolve_log_path,
};
use crate::cli::BestOfNArgs;
use crate::config::Config;
use crate::error::{PromptError, Result};
use crate::llm::{CompletionRequest, LlmClient, call_or_error, complete_repeated};
use crate::prompt::{render_evaluation, render_template};
use crate::session::{LlmParameters, Session, SessionMode, StageRecord, record_session};
use crate::vars::{Combination, expand, parse_definitions};
use tracing::{debug, info};

/// Execute the `promptmill best-of-n` command.
pub fn cmd_best_of_n(args: BestOfNArgs, mut config: Config) -> Result<()> {
    let api_key = config.llm.resolve_api_key(args.llm.api_key.as_deref())?;
    apply_best_of_n_overrides(&args, &mut config)?;

    let client = build_client(&config.llm, api_key)?;
    best_of_n_with_client(&args, &config, &client)
}

fn apply_best_of_n_overrides(args: &BestOfNArgs, config: &mut Config) -> Result<()> {
    apply_llm_overrides(&mut config.llm, &args.llm)?;
    if let Some(num_runs) = args.num_runs {
        config.best_of_n.num_runs = num_runs;
    }
    config.validate()
}

/// Evaluation template and definitions, falling back to the config.
fn load_eval_input(args: &BestOfNArgs, config: &Config) -> Result<StageInput> {
    let template = read_text_source(
        args.eval_template.as_deref(),
        args.eval_template_file.as_deref(),
        "evaluation template",
    )?
    .unwrap_or_else(|| config.best_of_n.eval_template.clone());

    let definitions = read_text_source(
        args.eval_vars.as_deref(),
        args.eval_vars_file.as_deref(),
        "evaluation variables",
    )?
    .unwrap_or_else(|| config.best_of_n.eval_vars.clone());

    Ok(StageInput { template, definitions })
}

/// The combination a stage runs with; extra combinations are reported and
/// ignored.
fn first_combination(mut combinations: Vec<Combination>, stage: &str) -> Result<Combination> {
    if combinations.len() > 1 {
        print_warnings(&[format!(
            "Found {} {} combinations. Best-of-N uses only the first one.",
            combinations.len(),
            stage
        )]);
    }

    if combinations.is_empty() {
        return Err(PromptError::UserError(format!(
            "No valid combinations found for the {} variables",
            stage
        )));
    }

    Ok(combinations.swap_remove(0))
}

fn best_of_n_with_client(
    args: &BestOfNArgs,
    config: &Config,
    client: &dyn LlmClient,
) -> Result<()> {
    // Both stages are loaded and expanded before the first model call.
    let initial_input = load_stage_input(&args.template)?;
    let eval_input = load_eval_input(args, config)?;
    let num_runs = config.best_of_n.num_runs;

    let initial_defs = parse_definitions(&initial_input.definitions);
    let expansion = expand(&initial_defs);
    print_warnings(&expansion.warnings);
    let combination = first_combination(expansion.combinations, "initial")?;

    let eval_defs = parse_definitions(&eval_input.definitions);
    let eval_expansion = expand(&eval_defs);
    print_warnings(&eval_expansion.warnings);
    let eval_combination = first_combination(eval_expansion.combinations, "evaluation")?;

    println!("\n=== Initial prompt ===");
    print_combination(&combination);
    let initial_prompt = render_template(&initial_input.template, &combination);
    print_section("Prompt", &initial_prompt);

    debug!(num_runs, "cmd_best_of_n: sending initial prompt");
    let request = CompletionRequest::from_config(&config.llm, initial_prompt.clone());
    let outputs = complete_repeated(client, &request, num_runs);

    let mut initial_stage =
        StageRecord::new(initial_input.template.clone(), initial_defs).with_num_runs(num_runs);
    for (i, output) in outputs.iter().enumerate() {
        print_section(&format!("Response {}/{}", i + 1, num_runs), output);
        initial_stage.push_run(
            combination.path_entries(),
            initial_prompt.clone(),
            output.clone(),
        );
    }

    let eval_prompt =
        render_evaluation(&eval_input.template, &eval_combination, &initial_prompt, &outputs);

    println!("\n=== Evaluation ===");
    print_section("Prompt", &eval_prompt);
    let eval_request = CompletionRequest::from_config(&config.llm, eval_prompt.clone());
    let eval_output = call_or_error(client, &eval_request);
    print_section("Best output", &eval_output);

    let mut eval_stage = StageRecord::new(eval_input.template, eval_defs);
    eval_stage.push_run(eval_combination.path_entries(), eval_prompt, eval_output);

    let session = Session::new(
        SessionMode::BestOfN,
        LlmParameters::from_config(&config.llm),
        initial_stage,
    )
    .with_evaluation(eval_stage);

    let log_path = resolve_log_path(
        &args.log,
        &config.best_of_n.log_file,
        config.best_of_n.append_timestamp,
    );
    if let Some(warning) = record_session(&log_path, session)? {
        print_warnings(&[warning]);
    }

    info!(path = %log_path.display(), num_runs, "cmd_best_of_n: session logged");
    println!("\nResults logged to {}", log_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{LogArgs, TemplateArgs};
    use crate::llm::MockLlmClient;
    use crate::session::{SessionLog, load_log};
    use crate::test_support::write_files;
    use std::path::Path;
    use tempfile::TempDir;

    fn args(template: &str, vars: &str, log: &Path) -> BestOfNArgs {
        BestOfNArgs {
            template: TemplateArgs {
                template: Some(template.to_string()),
                vars: Some(vars.to_string()),
                ..TemplateArgs::default()
            },
            log: LogArgs {
                log_file: Some(log.to_path_buf()),
                no_log_timestamp: true,
            },
            ..BestOfNArgs::default()
        }
    }

    fn config_with_runs(num_runs: usize) -> Config {
        let mut config = Config::default();
        config.best_of_n.num_runs = num_runs;
        config
    }

    fn read_log(path: &Path) -> SessionLog {
        load_log(path).log
    }

    #[test]
    fn test_best_of_n_feeds_outputs_into_evaluation() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["x", "y", "z", "best"]);

        let mut a = args("Solve {{problem}}", "problem=\"2+2\"", &log);
        a.eval_template = Some("{{initial_prompt}}|{{outputs}}".to_string());

        best_of_n_with_client(&a, &config_with_runs(3), &client).unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests[..3].iter().all(|r| r.prompt == "Solve 2+2"));
        assert_eq!(
            requests[3].prompt,
            "Solve 2+2|<Output1>\nx\n</Output1>\n\
             <Output2>\ny\n</Output2>\n<Output3>\nz\n</Output3>\n"
        );

        let session = &read_log(&log).sessions[0];
        assert_eq!(session.mode, SessionMode::BestOfN);
        assert_eq!(session.initial.num_runs, Some(3));
        assert_eq!(session.initial.runs.len(), 3);
        assert_eq!(session.initial.runs[2].output, "z");
        assert!(session.llm_parameters.max_iterations.is_none());

        let evaluation = session.evaluation.as_ref().unwrap();
        assert_eq!(evaluation.prompt_template, "{{initial_prompt}}|{{outputs}}");
        assert_eq!(evaluation.runs.len(), 1);
        assert_eq!(evaluation.runs[0].output, "best");
    }

    #[test]
    fn test_best_of_n_default_evaluation_template() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["a", "b", "merged"]);

        best_of_n_with_client(&args("Q", "", &log), &config_with_runs(2), &client).unwrap();

        let eval_prompt = &client.requests()[2].prompt;
        assert!(eval_prompt.starts_with("For the following input prompt"));
        assert!(eval_prompt.contains("<InputPrompt>Q</InputPrompt>"));
        assert!(eval_prompt.contains("<Output2>\nb\n</Output2>"));
        assert!(!eval_prompt.contains("{{"));
    }

    #[test]
    fn test_best_of_n_uses_first_combination_only() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["1", "2", "e"]);

        best_of_n_with_client(
            &args("{{n}}", r#"n=$$list(["first","second"])"#, &log),
            &config_with_runs(2),
            &client,
        )
        .unwrap();

        let requests = client.requests();
        assert_eq!(requests[0].prompt, "first");
        assert_eq!(requests[1].prompt, "first");
        let runs = &read_log(&log).sessions[0].initial.runs;
        assert_eq!(runs[0].paths.get("n_path").map(String::as_str), Some("first"));
    }

    #[test]
    fn test_best_of_n_failed_run_still_evaluates() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::new(vec![
            Ok("good".to_string()),
            Err("timeout".to_string()),
            Ok("final".to_string()),
        ]);

        let mut a = args("Q", "", &log);
        a.eval_template = Some("{{outputs}}".to_string());
        best_of_n_with_client(&a, &config_with_runs(2), &client).unwrap();

        let eval_prompt = &client.requests()[2].prompt;
        assert!(eval_prompt.contains("<Output1>\ngood\n</Output1>"));
        assert!(eval_prompt.contains("<Output2>\nError calling LLM: "));

        let session = &read_log(&log).sessions[0];
        assert_eq!(session.evaluation.as_ref().unwrap().runs[0].output, "final");
    }

    #[test]
    fn test_best_of_n_eval_vars_from_file_with_custom_tag() {
        let temp = TempDir::new().unwrap();
        write_files(
            temp.path(),
            &[
                ("eval.txt", "Pick one of:\n{{answers}}\nfor {{task}}"),
                ("eval_vars.txt", "answers=$$results(Answer), task=$$initial_prompt()"),
            ],
        );
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["one", "pick"]);

        let mut a = args("Name a color", "", &log);
        a.eval_template_file = Some(temp.path().join("eval.txt"));
        a.eval_vars_file = Some(temp.path().join("eval_vars.txt"));
        best_of_n_with_client(&a, &config_with_runs(1), &client).unwrap();

        assert_eq!(
            client.requests()[1].prompt,
            "Pick one of:\n<Answer1>\none\n</Answer1>\n\nfor Name a color"
        );
    }

    #[test]
    fn test_best_of_n_empty_initial_list_makes_no_calls() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["unused"]);

        let err = best_of_n_with_client(
            &args("{{n}}", "n=$$list([])", &log),
            &config_with_runs(2),
            &client,
        )
        .unwrap_err();

        assert!(matches!(err, PromptError::UserError(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_best_of_n_empty_eval_list_fails_before_calls() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["unused", "unused", "unused"]);

        let mut a = args("Q", "", &log);
        a.eval_vars = Some("outputs=$$results(O), x=$$list([])".to_string());

        let err = best_of_n_with_client(&a, &config_with_runs(2), &client).unwrap_err();

        assert_eq!(
            err.to_string(),
            "No valid combinations found for the evaluation variables"
        );
        assert_eq!(client.call_count(), 0);
        assert!(!log.exists());
    }

    #[test]
    fn test_best_of_n_initial_prompt_marks_special_references_undefined() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["a", "e"]);

        best_of_n_with_client(
            &args("Q {{o}}", "o=$$results(X)", &log),
            &config_with_runs(1),
            &client,
        )
        .unwrap();

        assert_eq!(client.requests()[0].prompt, "Q UNDEFINED_VARIABLE_o");
    }

    #[test]
    fn test_best_of_n_unreadable_eval_file_fails_before_calls() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("log.json");
        let client = MockLlmClient::replying(&["unused"]);

        let mut a = args("Q", "", &log);
        a.eval_template_file = Some(temp.path().join("missing.txt"));

        assert!(best_of_n_with_client(&a, &config_with_runs(2), &client).is_err());
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_cmd_best_of_n_without_credential() {
        let mut config = Config::default();
        config.llm.api_key_env = "PROMPTMILL_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = cmd_best_of_n(BestOfNArgs::default(), config).unwrap_err();
        assert!(matches!(err, PromptError::MissingCredential(_)));
    }

    #[test]
    fn test_overrides_reject_zero_runs() {
        let mut config = Config::default();
        let a = BestOfNArgs {
            num_runs: Some(0),
            ..BestOfNArgs::default()
        };
        assert!(apply_best_of_n_overrides(&a, &mut config).is_err());
    }
}
