//! Resolution of evaluation-stage placeholders that depend on earlier outputs.

use super::template::substitute;
use crate::vars::{Combination, DeferredRef};

/// Wrap each output in `<{tag}{n}>` … `</{tag}{n}>` with a 1-based `n`.
pub fn format_results(tag: &str, outputs: &[String]) -> String {
    outputs
        .iter()
        .enumerate()
        .map(|(i, output)| {
            let n = i + 1;
            format!("<{tag}{n}>\n{output}\n</{tag}{n}>\n")
        })
        .collect()
}

/// Render the evaluation template.
///
/// Text bindings are substituted as by [`super::render_template`]. A name
/// bound to `$$results(tag)` becomes the formatted outputs, and one bound to
/// `$$initial_prompt()` becomes the rendered initial prompt. Everything is
/// done in one pass over `template`, so inserted text is never rescanned.
pub fn render_evaluation(
    template: &str,
    combination: &Combination,
    initial_prompt: &str,
    outputs: &[String],
) -> String {
    substitute(template, combination, |reference| {
        Some(match reference {
            DeferredRef::Results { tag } => format_results(tag, outputs),
            DeferredRef::InitialPrompt => initial_prompt.to_string(),
        })
    })
}
