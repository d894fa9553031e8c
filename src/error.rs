//! Error types for the promptmill CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Model-service failures are not represented here: they degrade to an inline
//! error string and never abort a run (see `llm::call_or_error`).

use crate::exit_codes;
use thiserror::Error;

/// Main error type for promptmill operations.
#[derive(Error, Debug)]
pub enum PromptError {
    /// User provided invalid arguments or input that cannot be used.
    #[error("{0}")]
    UserError(String),

    /// No credential for the model service was supplied.
    #[error("Missing API key: {0}")]
    MissingCredential(String),

    /// The session log could not be written.
    #[error("Failed to write session log: {0}")]
    LogError(String),
}

impl PromptError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PromptError::UserError(_) => exit_codes::USER_ERROR,
            PromptError::MissingCredential(_) => exit_codes::MISSING_CREDENTIAL,
            PromptError::LogError(_) => exit_codes::LOG_FAILURE,
        }
    }
}

/// Result type alias for promptmill operations.
pub type Result<T> = std::result::Result<T, PromptError>;
