//! LLM client module for promptmill
//!
//! Provides the model-service boundary: a synchronous client trait, the
//! Anthropic implementation, and the helpers that turn failures into inline
//! error strings so a run never aborts on a bad call.

mod anthropic;
mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
#[cfg(test)]
pub use client::mock::MockLlmClient;
pub use error::LlmError;
pub use types::{CompletionRequest, CompletionResponse, TokenUsage};

use tracing::{debug, warn};

/// Prefix of the output recorded when a call fails
pub const CALL_ERROR_PREFIX: &str = "Error calling LLM: ";

/// Send one request; on failure return a descriptive error string instead
pub fn call_or_error(client: &dyn LlmClient, request: &CompletionRequest) -> String {
    match client.complete(request) {
        Ok(response) => response.content,
        Err(e) => {
            warn!(error = %e, "call_or_error: model call failed");
            format!("{}{}", CALL_ERROR_PREFIX, e)
        }
    }
}

/// Send the same request `runs` times, strictly one after another
///
/// Output order matches request order. A failed request degrades to an error
/// string for that run only; later runs are still issued.
pub fn complete_repeated(
    client: &dyn LlmClient,
    request: &CompletionRequest,
    runs: usize,
) -> Vec<String> {
    debug!(runs, "complete_repeated: called");
    (0..runs).map(|_| call_or_error(client, request)).collect()
}
