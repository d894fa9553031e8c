//! Placeholder substitution.

use crate::vars::{BindingValue, Combination, DeferredRef, PATH_SUFFIX};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Prefix written in place of a placeholder that has no binding.
pub const UNDEFINED_PREFIX: &str = "UNDEFINED_VARIABLE_";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Invalid placeholder regex"));

/// Render a template against one combination.
///
/// Every `{{name}}` bound to text is replaced by that text; `_path`
/// companions are never substituted. Anything else, including a name bound
/// to a `$$results` or `$$initial_prompt` reference, becomes
/// `UNDEFINED_VARIABLE_<name>`.
///
/// Substitution is a single pass, so values that themselves contain `{{...}}`
/// are inserted verbatim.
pub fn render_template(template: &str, combination: &Combination) -> String {
    substitute(template, combination, |_| None)
}

/// Single-pass substitution shared by both stages.
///
/// `deferred` supplies the text for a deferred binding; `None` marks the
/// placeholder undefined.
pub(super) fn substitute<F>(template: &str, combination: &Combination, deferred: F) -> String
where
    F: Fn(&DeferredRef) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            let value = match combination.get(name) {
                Some(BindingValue::Text(value)) if !name.ends_with(PATH_SUFFIX) => {
                    Some(value.clone())
                }
                Some(BindingValue::Deferred(reference)) => deferred(reference),
                _ => None,
            };
            value.unwrap_or_else(|| format!("{}{}", UNDEFINED_PREFIX, name))
        })
        .into_owned()
}
