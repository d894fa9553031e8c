use std::fs;
use std::path::Path;

/// Create each `(relative path, content)` pair under `root`, making parent
/// directories as needed.
pub(crate) fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}
