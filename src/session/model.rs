//! Session log document types.

use crate::config::LlmConfig;
use crate::vars::VariableDefs;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Human-readable timestamp stored on each session.
const SESSION_DATETIME_FORMAT: &str = "%d%b%Y - %H:%M:%S";

/// Root of the log document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a log with `session` added after all existing sessions.
    pub fn append(mut self, session: Session) -> Self {
        self.sessions.push(session);
        self
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Indented JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Which command produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// `promptmill run`: one call per combination.
    TemplateTest,
    /// `promptmill best-of-n`: N initial runs plus one evaluation.
    BestOfN,
}

/// One invocation of the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub datetime: String,

    /// `user@host` of whoever ran the session.
    pub actor: String,

    pub mode: SessionMode,

    pub llm_parameters: LlmParameters,

    pub initial: StageRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<StageRecord>,
}

impl Session {
    /// Start a session stamped with the current local time and actor.
    pub fn new(mode: SessionMode, llm_parameters: LlmParameters, initial: StageRecord) -> Self {
        Self {
            datetime: Local::now().format(SESSION_DATETIME_FORMAT).to_string(),
            actor: actor_string(),
            mode,
            llm_parameters,
            initial,
            evaluation: None,
        }
    }

    pub fn with_evaluation(mut self, evaluation: StageRecord) -> Self {
        self.evaluation = Some(evaluation);
        self
    }
}

/// Model parameters as recorded in the log. Has no credential field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmParameters {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl LlmParameters {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            system_prompt: config.system_prompt.clone(),
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Template, definitions and runs of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub prompt_template: String,
    pub variables: VariableDefs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_runs: Option<usize>,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl StageRecord {
    pub fn new(prompt_template: impl Into<String>, variables: VariableDefs) -> Self {
        Self {
            prompt_template: prompt_template.into(),
            variables,
            num_runs: None,
            runs: Vec::new(),
        }
    }

    pub fn with_num_runs(mut self, num_runs: usize) -> Self {
        self.num_runs = Some(num_runs);
        self
    }

    /// Record the next run; indices are 1-based and follow call order.
    pub fn push_run(
        &mut self,
        paths: BTreeMap<String, String>,
        rendered_prompt: impl Into<String>,
        output: impl Into<String>,
    ) {
        self.runs.push(RunRecord {
            index: self.runs.len() + 1,
            paths,
            rendered_prompt: rendered_prompt.into(),
            output: output.into(),
        });
    }
}

/// One prompt sent and the text received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub index: usize,

    /// `_path` companions of the combination that produced this prompt.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, String>,

    pub rendered_prompt: String,
    pub output: String,
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
