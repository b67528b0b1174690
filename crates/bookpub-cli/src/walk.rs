//! Manuscript traversal shared by the converter and the template linter.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Every regular file under `root`, in path order. Hidden entries and
/// everything below a hidden directory are skipped.
pub fn files_under(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
