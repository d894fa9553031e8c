//! Reading and rewriting the log document on disk.

use super::model::{Session, SessionLog};
use crate::error::{PromptError, Result};
use crate::fs::atomic_write_file;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// A log read from disk plus any problem that forced a fresh start.
#[derive(Debug)]
pub struct LoadedLog {
    pub log: SessionLog,
    pub warning: Option<String>,
}

/// Load the log at `path`.
///
/// A missing file yields an empty log silently. An unreadable or unparsable
/// file yields an empty log and a warning; the old content is overwritten on
/// the next write.
pub fn load_log(path: &Path) -> LoadedLog {
    let parsed = match fs::read_to_string(path) {
        Ok(text) => SessionLog::from_json(&text).map_err(|e| e.to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "load_log: no existing log");
            return LoadedLog {
                log: SessionLog::new(),
                warning: None,
            };
        }
        Err(e) => Err(e.to_string()),
    };

    match parsed {
        Ok(log) => LoadedLog { log, warning: None },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "load_log: discarding unreadable log");
            LoadedLog {
                log: SessionLog::new(),
                warning: Some(format!("Error opening log file: {}. Creating new log.", e)),
            }
        }
    }
}

/// Write the whole log to `path`, creating parent directories as needed.
pub fn write_log(path: &Path, log: &SessionLog) -> Result<()> {
    let text = log
        .to_pretty_json()
        .map_err(|e| PromptError::LogError(format!("failed to serialize log: {}", e)))?;

    atomic_write_file(path, &text)
        .map_err(|e| PromptError::LogError(format!("{}: {}", path.display(), e)))
}

/// Append `session` to the log at `path`.
///
/// Returns the load warning, if the existing file had to be discarded.
pub fn record_session(path: &Path, session: Session) -> Result<Option<String>> {
    let LoadedLog { log, warning } = load_log(path);
    let log = log.append(session);
    write_log(path, &log)?;
    debug!(path = %path.display(), sessions = log.sessions.len(), "record_session: written");
    Ok(warning)
}
