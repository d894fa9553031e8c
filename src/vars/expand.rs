//! Expansion of variable definitions into concrete combinations.
//!
//! File and directory bindings are read from disk here. Failures never abort
//! expansion: they degrade to visible marker values and are reported through
//! `Expansion::warnings`.

use super::spec::{VariableDefs, VariableSpec};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix of the companion entries that record where an iterating value came
/// from. Never substituted into templates.
pub const PATH_SUFFIX: &str = "_path";

/// A binding that can only be resolved once earlier outputs exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredRef {
    Results { tag: String },
    InitialPrompt,
}

/// The value bound to a name within one combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingValue {
    Text(String),
    Deferred(DeferredRef),
}

impl BindingValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindingValue::Text(s) => Some(s),
            BindingValue::Deferred(_) => None,
        }
    }
}

/// One fully-resolved binding set, used to render one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination {
    values: BTreeMap<String, BindingValue>,
}

impl Combination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: BindingValue) {
        self.values.insert(name.into(), value);
    }

    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, BindingValue::Text(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `_path` companion entries, keyed by their full name.
    pub fn path_entries(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter(|(k, _)| k.ends_with(PATH_SUFFIX))
            .filter_map(|(k, v)| v.as_text().map(|t| (k.clone(), t.to_string())))
            .collect()
    }
}

/// Result of expanding a set of definitions.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Combinations in Cartesian-product order.
    pub combinations: Vec<Combination>,

    /// Non-fatal problems met while reading files and directories.
    pub warnings: Vec<String>,
}

/// Values contributed by one iterating variable.
struct IterValues {
    name: String,
    values: Vec<String>,
    sources: Vec<String>,
}

/// Expand definitions into every combination.
///
/// Iterating variables (`Dir`, `List`) are folded in declaration order, each
/// one multiplying the combination count by its value count; the first one
/// declared varies slowest. Fixed variables are then copied into every
/// combination.
pub fn expand(defs: &VariableDefs) -> Expansion {
    if defs.is_empty() {
        debug!("expand: no definitions, single empty combination");
    }

    let mut warnings = Vec::new();
    let mut fixed: Vec<(String, BindingValue)> = Vec::new();
    let mut iterating: Vec<IterValues> = Vec::new();

    for (name, spec) in defs.iter() {
        match spec {
            VariableSpec::Literal { value } => {
                fixed.push((name.to_string(), BindingValue::Text(value.clone())));
            }
            VariableSpec::File { path } => {
                let value = match fs::read_to_string(path) {
                    Ok(content) => content,
                    Err(e) => {
                        warnings.push(format!("Error reading file {}: {}", path, e));
                        format!("ERROR: Could not read file {}", path)
                    }
                };
                fixed.push((name.to_string(), BindingValue::Text(value)));
            }
            VariableSpec::Dir { path, recursive } => {
                let (values, sources) = read_dir_contents(path, *recursive, &mut warnings);
                if values.is_empty() {
                    warnings.push(format!("No readable files found in directory: {}", path));
                    fixed.push((
                        name.to_string(),
                        BindingValue::Text(format!("No files found in {}", path)),
                    ));
                } else {
                    iterating.push(IterValues {
                        name: name.to_string(),
                        values,
                        sources,
                    });
                }
            }
            VariableSpec::List { elements } => {
                iterating.push(IterValues {
                    name: name.to_string(),
                    values: elements.clone(),
                    sources: elements.clone(),
                });
            }
            VariableSpec::Results { tag } => {
                fixed.push((
                    name.to_string(),
                    BindingValue::Deferred(DeferredRef::Results { tag: tag.clone() }),
                ));
            }
            VariableSpec::InitialPrompt => {
                fixed.push((
                    name.to_string(),
                    BindingValue::Deferred(DeferredRef::InitialPrompt),
                ));
            }
        }
    }

    let mut combinations = vec![Combination::new()];
    for var in &iterating {
        let path_key = format!("{}{}", var.name, PATH_SUFFIX);
        let mut next = Vec::with_capacity(combinations.len() * var.values.len());
        for combo in &combinations {
            for (value, source) in var.values.iter().zip(&var.sources) {
                let mut new_combo = combo.clone();
                new_combo.insert_text(var.name.clone(), value.clone());
                new_combo.insert_text(path_key.clone(), source.clone());
                next.push(new_combo);
            }
        }
        combinations = next;
    }

    for combo in &mut combinations {
        for (name, value) in &fixed {
            combo.insert(name.clone(), value.clone());
        }
    }

    debug!(
        fixed = fixed.len(),
        iterating = iterating.len(),
        combinations = combinations.len(),
        "expand: done"
    );

    Expansion {
        combinations,
        warnings,
    }
}

/// Read every file of a directory binding, skipping unreadable files.
///
/// Returns the contents and the matching display paths, both sorted by path
/// so the order is stable across platforms.
fn read_dir_contents(
    base: &str,
    recursive: bool,
    warnings: &mut Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let paths = if recursive {
        walk_files(Path::new(base))
    } else {
        list_files(Path::new(base))
    };

    let mut contents = Vec::with_capacity(paths.len());
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(content) => {
                contents.push(content);
                sources.push(path.display().to_string());
            }
            Err(e) => warnings.push(format!("Skipping file {}: {}", path.display(), e)),
        }
    }
    (contents, sources)
}

fn walk_files(base: &Path) -> Vec<PathBuf> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "walk_files: skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn list_files(base: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %base.display(), error = %e, "list_files: cannot read directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
