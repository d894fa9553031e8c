//! Log file naming.

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Timestamp inserted into log file names.
const FILE_TIMESTAMP_FORMAT: &str = "%d%b%Y_%H-%M-%S";

/// Final log path for `base`.
///
/// With `append_timestamp` the stem gets `_{timestamp}` appended before the
/// extension, so `logs/run.json` becomes `logs/run_15Oct2026_14-03-11.json`.
pub fn log_file_path(base: &Path, append_timestamp: bool, now: NaiveDateTime) -> PathBuf {
    if !append_timestamp {
        return base.to_path_buf();
    }

    let stamp = now.format(FILE_TIMESTAMP_FORMAT).to_string();
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    };

    base.with_file_name(file_name)
}

/// [`log_file_path`] stamped with the current local time.
pub fn timestamped_log_path(base: &Path, append_timestamp: bool) -> PathBuf {
    log_file_path(base, append_timestamp, Local::now().naive_local())
}
