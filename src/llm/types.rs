//! LLM request/response types

use crate::config::LlmConfig;

/// A completion request - everything needed for one model call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,

    /// The rendered prompt, sent as the single user message
    pub prompt: String,

    /// Empty means no system prompt
    pub system_prompt: String,

    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl CompletionRequest {
    /// Build a request for `prompt` using the configured parameters
    pub fn from_config(config: &LlmConfig, prompt: impl Into<String>) -> Self {
        Self {
            model: config.model.clone(),
            prompt: prompt.into(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        }
    }
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completed response
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text of the response
    pub content: String,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    #[cfg(test)]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
        }
    }
}
