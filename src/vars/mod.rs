//! Variable definitions for prompt templates.
//!
//! This module provides:
//!
//! - **Spec**: The `VariableSpec` sum type and the ordered `VariableDefs` map
//! - **Parser**: The `$$` definitions mini-language
//! - **Expand**: Resolution of file/dir/list bindings into combinations
//!
//! # Definitions Syntax
//!
//! ```text
//! topic="water", notes=$$file(notes.md), doc=$$dir(./docs, recursive=True),
//! tone=$$list(["formal", "casual"])
//! ```
//!
//! The evaluation stage of best-of-N additionally understands
//! `$$results(Tag)` and `$$initial_prompt()`.

mod expand;
mod parser;
mod spec;

pub use expand::{BindingValue, Combination, DeferredRef, Expansion, PATH_SUFFIX, expand};
pub use parser::parse_definitions;
pub use spec::{VariableDefs, VariableSpec};
