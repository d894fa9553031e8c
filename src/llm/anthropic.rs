//! Anthropic Claude API client implementation
//!
//! Implements the LlmClient trait for Anthropic's Messages API using a
//! blocking HTTP client. There is no retry loop: a failed call is reported
//! once and the caller decides how to degrade.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage};
use crate::config::LlmConfig;

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl AnthropicClient {
    /// Create a new client from configuration and an already-resolved key
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "AnthropicClient::new: called"
        );
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            "build_request_body: called"
        );
        let mut body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "top_p": request.top_p,
            "messages": [
                { "role": "user", "content": request.prompt }
            ],
        });

        if !request.system_prompt.is_empty() {
            body["system"] = serde_json::json!(request.system_prompt);
        }

        body
    }

    /// Extract the first text block from the API response
    fn parse_response(api_response: AnthropicResponse) -> Result<CompletionResponse, LlmError> {
        debug!(stop_reason = ?api_response.stop_reason, "parse_response: called");
        let content = api_response
            .content
            .into_iter()
            .find_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .ok_or_else(|| {
                LlmError::InvalidResponse("response contained no text content".to_string())
            })?;

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            },
        })
    }
}

impl LlmClient for AnthropicClient {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "complete: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(request);

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            debug!(status = status.as_u16(), "complete: API error");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text()?;
        let api_response: AnthropicResponse = serde_json::from_str(&text)?;
        let parsed = Self::parse_response(api_response)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "complete: success"
        );
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}
