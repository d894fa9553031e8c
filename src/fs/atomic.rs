//! Atomic file replacement.
//!
//! # Implementation Strategy
//!
//! 1. Create missing parent directories
//! 2. Write content to `.{filename}.tmp` in the same directory
//! 3. Sync the temp file to disk
//! 4. Rename it over the target
//!
//! `std::fs::rename` replaces an existing destination on both POSIX and
//! Windows, as long as source and destination share a filesystem. A crash may
//! leave the temp file behind; the target itself is always either the old
//! or the new content.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `content`, creating parent directories.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content.as_bytes())?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    sync_parent_dir(path);
    Ok(())
}

/// Persist the directory entry of a freshly renamed file.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

/// `.{filename}.tmp` next to the target.
fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file path '{}'", target.display()),
        )
    })?;

    let temp_name = format!(".{}.tmp", filename);
    Ok(match target.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let result = File::create(path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");

        atomic_write_file(&path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, "old content that is longer").unwrap();

        atomic_write_file(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("nested").join("log.json");

        atomic_write_file(&path, "x").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");

        atomic_write_file(&path, "x").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["log.json"]);
    }

    #[test]
    fn test_temp_path_for() {
        let temp = temp_path_for(Path::new("/some/dir/log.json")).unwrap();
        assert_eq!(temp, PathBuf::from("/some/dir/.log.json.tmp"));
    }

    #[test]
    fn test_temp_path_requires_file_name() {
        assert!(temp_path_for(Path::new("/")).is_err());
    }

    #[test]
    fn test_unicode_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("журнал.json");

        atomic_write_file(&path, "ok").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ok");
    }
}
