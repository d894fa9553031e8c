//! Prompt rendering for both stages of a run.
//!
//! This module provides:
//!
//! - **Template**: `{{name}}` substitution from a combination
//! - **Special**: Evaluation-stage rendering that also fills `$$results` /
//!   `$$initial_prompt` references
//!
//! # Template Syntax
//!
//! Templates use `{{variable}}` placeholders with literal double braces:
//!
//! ```text
//! Summarize the following document about {{topic}}:
//!
//! {{document}}
//! ```
//!
//! There is no nesting and no escaping. A placeholder with no binding is
//! rendered as `UNDEFINED_VARIABLE_<name>` so the gap is visible in the
//! prompt that was actually sent.

mod special;
mod template;

pub use special::render_evaluation;
pub use template::render_template;
