//! Timestamped backup file naming shared by the file-backed stores.
//!
//! Backups are named `builders-YYYYMMDD-HHMMSS-NNNNNNNNN.<ext>` (UTC, with
//! nanoseconds), so lexical order is chronological order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const PREFIX: &str = "builders-";

/// A fresh backup path under `dir` with the given extension.
pub fn backup_path(dir: &Path, extension: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S-%9f");
    dir.join(format!("{}{}.{}", PREFIX, stamp, extension))
}

/// The newest backup in `dir` with the given extension, if any.
pub fn latest_backup(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }
    let suffix = format!(".{}", extension);
    let mut newest: Option<(String, PathBuf)> = None;
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(PREFIX) || !name.ends_with(&suffix) {
            continue;
        }
        if newest.as_ref().map_or(true, |(n, _)| name > *n) {
            newest = Some((name, entry.path()));
        }
    }
    Ok(newest.map(|(_, p)| p))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}
