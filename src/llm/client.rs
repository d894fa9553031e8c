//! LlmClient trait definition

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless model client - each call is independent (fresh context)
///
/// Calls are synchronous: the caller blocks until the response arrives, and
/// repeated runs are issued one after another so output order is preserved.
pub trait LlmClient {
    /// Send a single completion request
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
