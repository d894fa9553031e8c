//! Exit code constants for the promptmill CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable input, invalid config)
//! - 2: Missing model credential
//! - 3: Session log could not be written

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or nothing to run.
pub const USER_ERROR: i32 = 1;

/// No API key was available; checked before any model call is issued.
pub const MISSING_CREDENTIAL: i32 = 2;

/// The session log could not be persisted.
pub const LOG_FAILURE: i32 = 3;
