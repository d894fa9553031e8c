//! Typed variable specifications.

use serde::{Deserialize, Serialize};

/// What a declared variable is bound to.
///
/// Serialized with an internal `type` tag so the session log records the
/// kind of binding alongside its path/recursive/tag metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableSpec {
    /// Plain text, quotes already stripped.
    Literal { value: String },

    /// Full text of one file. Fixed across combinations.
    File { path: String },

    /// Contents of every file in a directory. Iterating.
    Dir { path: String, recursive: bool },

    /// Explicit list of values. Iterating.
    List { elements: Vec<String> },

    /// Prior outputs wrapped in `<{tag}{n}>` elements. Evaluation stage only.
    Results { tag: String },

    /// The rendered initial-stage prompt. Evaluation stage only.
    InitialPrompt,
}

impl VariableSpec {
    /// Convenience constructor for literal values.
    pub fn literal(value: impl Into<String>) -> Self {
        VariableSpec::Literal {
            value: value.into(),
        }
    }
}

/// A named variable definition as recorded in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSpec {
    pub name: String,
    #[serde(flatten)]
    pub spec: VariableSpec,
}

/// Insertion-ordered mapping of variable name to specification.
///
/// Re-declaring a name replaces its spec in place, so the variable keeps the
/// position of its first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableDefs {
    entries: Vec<NamedSpec>,
}

impl VariableDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a definition.
    pub fn insert(&mut self, name: impl Into<String>, spec: VariableSpec) {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.spec = spec,
            None => self.entries.push(NamedSpec { name, spec }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.spec)
    }

    /// Iterate definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableSpec)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, VariableSpec)> for VariableDefs {
    fn from_iter<I: IntoIterator<Item = (K, VariableSpec)>>(iter: I) -> Self {
        let mut defs = VariableDefs::new();
        for (name, spec) in iter {
            defs.insert(name, spec);
        }
        defs
    }
}
