//! Parser for the variable definitions mini-language.
//!
//! # Syntax
//!
//! - `name=value` pairs separated by top-level commas
//! - `value` is a quoted or bare literal, or one of the `$$` forms:
//!   `$$file(path)`, `$$dir(path)`, `$$dir(path, recursive=True)`,
//!   `$$list([...])`, `$$results(tag)`, `$$initial_prompt()`
//!
//! # Error Handling
//!
//! The parser never fails. Malformed special forms fall back to literals,
//! list payloads that are not valid JSON fall back to comma splitting, and
//! segments without a valid `name=` prefix are skipped.

use super::spec::{VariableDefs, VariableSpec};
use tracing::debug;

/// Parse a definitions string into an ordered map of variable specs.
///
/// # Examples
///
/// ```ignore
/// let defs = parse_definitions(r#"topic="water", n=$$list(["a","b"])"#);
/// assert_eq!(defs.len(), 2);
/// ```
pub fn parse_definitions(input: &str) -> VariableDefs {
    let mut defs = VariableDefs::new();
    let mut cursor = Cursor::new(input);

    while !cursor.at_end() {
        cursor.skip_separators();
        if cursor.at_end() {
            break;
        }

        let Some(name) = cursor.read_name() else {
            let skipped = cursor.skip_segment();
            debug!(segment = %skipped, "parse_definitions: skipping segment without a valid name");
            continue;
        };

        cursor.skip_whitespace();
        if !cursor.eat('=') {
            let skipped = cursor.skip_segment();
            debug!(%name, rest = %skipped, "parse_definitions: skipping segment without '='");
            continue;
        }
        cursor.skip_whitespace();

        let raw = cursor.read_value();
        let spec = parse_value(raw.trim());
        debug!(%name, ?spec, "parse_definitions: parsed definition");
        defs.insert(name, spec);
    }

    debug!(count = defs.len(), "parse_definitions: done");
    defs
}

/// Classify a single trimmed value.
fn parse_value(value: &str) -> VariableSpec {
    if let Some(special) = value.strip_prefix("$$") {
        if let Some(spec) = parse_special(special) {
            return spec;
        }
        debug!(%value, "parse_value: unrecognized special form, keeping literal");
        return VariableSpec::Literal {
            value: value.to_string(),
        };
    }

    VariableSpec::Literal {
        value: strip_quotes(value).to_string(),
    }
}

/// Parse the text after `$$`. Returns `None` when the form is unknown or
/// is not closed by `)`.
fn parse_special(text: &str) -> Option<VariableSpec> {
    let open = text.find('(')?;
    let keyword = &text[..open];
    let payload = text[open + 1..].strip_suffix(')')?;

    match keyword {
        "file" => Some(VariableSpec::File {
            path: strip_quotes(payload.trim()).to_string(),
        }),
        "dir" => {
            let (path, params) = match payload.split_once(',') {
                Some((path, params)) => (path, Some(params)),
                None => (payload, None),
            };
            let recursive = params.is_some_and(has_recursive_flag);
            Some(VariableSpec::Dir {
                path: strip_quotes(path.trim()).to_string(),
                recursive,
            })
        }
        "list" => Some(VariableSpec::List {
            elements: parse_list_payload(payload.trim()),
        }),
        "results" => Some(VariableSpec::Results {
            tag: payload.trim().to_string(),
        }),
        "initial_prompt" => Some(VariableSpec::InitialPrompt),
        _ => None,
    }
}

fn has_recursive_flag(params: &str) -> bool {
    let compact: String = params
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("recursive=true")
}

/// Parse a `$$list(...)` payload.
///
/// A JSON array keeps string elements verbatim and renders other scalars in
/// their JSON text form. Any other valid JSON becomes a single element equal
/// to the raw payload. Invalid JSON is split on commas.
fn parse_list_payload(payload: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Ok(_) => vec![payload.to_string()],
        Err(e) => {
            debug!(%payload, error = %e, "parse_list_payload: not JSON, splitting on commas");
            let inner = payload
                .strip_prefix('[')
                .and_then(|p| p.strip_suffix(']'))
                .unwrap_or(payload);
            inner
                .split(',')
                .map(|elem| strip_quotes(elem.trim()).to_string())
                .collect()
        }
    }
}

/// Strip one pair of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Byte cursor over the definitions string.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek()
            && c.is_whitespace()
        {
            self.pos += c.len_utf8();
        }
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek()
            && (c.is_whitespace() || c == ',')
        {
            self.pos += c.len_utf8();
        }
    }

    /// Read `[A-Za-z_][A-Za-z0-9_]*`, or nothing.
    fn read_name(&mut self) -> Option<String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(rest[..end].to_string())
    }

    /// Skip to the next comma (or end) and return what was skipped.
    fn skip_segment(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(',').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Read a value up to the next top-level comma.
    ///
    /// Commas nested in brackets or quoted runs do not terminate the value.
    /// When brackets or quotes never balance, the value ends at its first
    /// comma instead.
    fn read_value(&mut self) -> &'a str {
        let rest = self.rest();
        match top_level_end(rest) {
            Some(end) => {
                self.pos += end;
                &rest[..end]
            }
            None => self.skip_segment(),
        }
    }
}

/// Byte offset of the first top-level comma (or the end of input). `None`
/// when the value leaves a bracket or quote open.
fn top_level_end(value: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let start = value.len() - value.trim_start().len();

    for (i, c) in value.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && depth > 0 {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' if i == start => quote = Some(c),
            '"' if depth > 0 => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }

    if depth == 0 && quote.is_none() {
        Some(value.len())
    } else {
        None
    }
}
