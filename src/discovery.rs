//! Input folder scanning

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file queued for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// File name without directory or extension, used as the report key
    pub stem: String,
}

impl InputFile {
    fn from_path(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, stem }
    }
}

/// List regular files in `dir`, sorted by path.
///
/// Only the top level is scanned unless `recursive` is set. Entries that
/// cannot be read are skipped with a warning.
pub fn scan_folder(dir: &Path, recursive: bool) -> Result<Vec<InputFile>> {
    if !dir.is_dir() {
        anyhow::bail!("Input folder does not exist: {:?}", dir);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            files.push(InputFile::from_path(entry.into_path()));
        }
    }

    log::info!("Found {} file(s) in {:?}", files.len(), dir);
    Ok(files)
}

/// Read a whole file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))
}
