//! Session logging for promptmill.
//!
//! Every invocation of `run` or `best-of-n` appends one session record to a
//! JSON log document. The document is read, extended in memory, and written
//! back in full:
//!
//! ```text
//! {
//!   "sessions": [
//!     { "datetime": "15Oct2026 - 14:03:11", "mode": "template_test", ... },
//!     { "datetime": "15Oct2026 - 14:09:42", "mode": "best_of_n", ... }
//!   ]
//! }
//! ```
//!
//! A missing log starts a new document. A log that cannot be parsed is
//! replaced by a new document and reported as a warning. The model
//! credential is not part of any logged type.

mod model;
mod path;
mod store;

pub use model::{LlmParameters, RunRecord, Session, SessionLog, SessionMode, StageRecord};
pub use path::{log_file_path, timestamped_log_path};
pub use store::{LoadedLog, load_log, record_session, write_log};
