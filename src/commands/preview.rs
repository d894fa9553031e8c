//! Implementation of the `promptmill preview` command.

use super::{
    StageInput, limit_combinations, load_stage_input, print_combination, print_section,
    print_warnings,
};
use crate::cli::PreviewArgs;
use crate::config::Config;
use crate::error::{PromptError, Result};
use crate::prompt::render_template;
use crate::vars::{expand, parse_definitions};

/// Execute the `promptmill preview` command.
///
/// Needs no credential, makes no model call and writes no log.
pub fn cmd_preview(args: PreviewArgs, config: Config) -> Result<()> {
    for prompt in render_previews(&args, &config)? {
        print_section("Prompt", &prompt);
    }
    Ok(())
}

/// Render the prompts `run` would send, listing each combination as it goes.
fn render_previews(args: &PreviewArgs, config: &Config) -> Result<Vec<String>> {
    let max_iterations = args.max_iterations.unwrap_or(config.run.max_iterations);
    if max_iterations == 0 {
        return Err(PromptError::UserError("max-iterations must be greater than 0".to_string()));
    }

    let StageInput { template, definitions } = load_stage_input(&args.template)?;
    let expansion = expand(&parse_definitions(&definitions));
    print_warnings(&expansion.warnings);

    if expansion.combinations.is_empty() {
        return Err(PromptError::UserError("No valid combinations found".to_string()));
    }

    let (combinations, limit_warning) = limit_combinations(expansion.combinations, max_iterations);
    if let Some(warning) = limit_warning {
        print_warnings(&[warning]);
    }

    let total = combinations.len();
    Ok(combinations
        .iter()
        .enumerate()
        .map(|(i, combination)| {
            println!("\n=== Combination {}/{} ===", i + 1, total);
            print_combination(combination);
            render_template(&template, combination)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::TemplateArgs;

    fn args(template: &str, vars: &str) -> PreviewArgs {
        PreviewArgs {
            template: TemplateArgs {
                template: Some(template.to_string()),
                vars: Some(vars.to_string()),
                ..TemplateArgs::default()
            },
            max_iterations: None,
        }
    }

    #[test]
    fn preview_renders_every_combination() {
        let prompts = render_previews(
            &args("{{topic}}-{{n}}", r#"topic="water", n=$$list(["a","b"])"#),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(prompts, vec!["water-a", "water-b"]);
    }

    #[test]
    fn preview_marks_undefined_placeholders() {
        let prompts =
            render_previews(&args("{{known}} {{unknown}}", "known=1"), &Config::default()).unwrap();
        assert_eq!(prompts, vec!["1 UNDEFINED_VARIABLE_unknown"]);
    }

    #[test]
    fn preview_marks_evaluation_only_references_undefined() {
        let prompts = render_previews(
            &args("A {{o}} B {{p}}", "o=$$results(X), p=$$initial_prompt()"),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(prompts, vec!["A UNDEFINED_VARIABLE_o B UNDEFINED_VARIABLE_p"]);
    }

    #[test]
    fn preview_applies_iteration_limit() {
        let mut a = args("{{n}}", r#"n=$$list(["1","2","3"])"#);
        a.max_iterations = Some(2);
        let prompts = render_previews(&a, &Config::default()).unwrap();
        assert_eq!(prompts, vec!["1", "2"]);
    }

    #[test]
    fn preview_rejects_zero_limit() {
        let mut a = args("{{n}}", "n=1");
        a.max_iterations = Some(0);
        assert!(render_previews(&a, &Config::default()).is_err());
    }
}
