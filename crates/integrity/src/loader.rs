//! Local file-fetch collaborator
//!
//! Walks a directory and produces the ordered file records the scorer
//! consumes.

use sealcheck_core::{Error, FileRecord, Result};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

const SKIPPED_DIRS: [&str; 1] = [".git"];

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Load every regular file below `root`.
///
/// Paths are relative to `root`, use `/` separators and come out sorted.
/// A file that cannot be read is kept with the hash error sentinel so the
/// scorer can report it. Only failing to open `root` itself is an error.
pub fn load_directory(root: impl AsRef<Path>) -> Result<Vec<FileRecord>> {
    let root = root.as_ref();
    let metadata = std::fs::metadata(root).map_err(|e| Error::file_system(root, "read", e))?;
    if !metadata.is_dir() {
        return Err(Error::configuration(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = relative_path(root, entry.path());
        match std::fs::read(entry.path()) {
            Ok(content) => files.push(FileRecord::with_content(path, content)),
            Err(e) => {
                let error = Error::hashing(&path, e.to_string());
                tracing::warn!(%error, "file could not be read");
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(FileRecord::new(path, size).hash_failed());
            }
        }
    }

    tracing::debug!(root = %root.display(), files = %files.len(), "directory loaded");
    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
