//! Record mutations from the command line: add, update, remove, validate,
//! and backup restore.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use van_directory_core::models::{BuilderPatch, BuilderRecord};

use crate::backend::open_directory;
use crate::config::Config;

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub async fn run_add(config: &Config, file: &Path) -> Result<()> {
    let record: BuilderRecord = read_json(file)?;
    let mut directory = open_directory(config).await?;
    let id = directory.add(record).await?;
    tracing::info!(id = %id, "added builder");
    println!("Added builder {}", id);
    Ok(())
}

pub async fn run_update(config: &Config, id: &str, file: &Path) -> Result<()> {
    let patch: BuilderPatch = read_json(file)?;
    let mut directory = open_directory(config).await?;
    let updated = directory.update(id, patch).await?;
    tracing::info!(id = %updated.id, "updated builder");
    println!("Updated builder {} ({})", updated.id, updated.name);
    Ok(())
}

pub async fn run_remove(config: &Config, id: &str) -> Result<()> {
    let mut directory = open_directory(config).await?;
    let removed = directory.remove(id).await?;
    tracing::info!(id = %removed.id, "removed builder");
    println!("Removed builder {} ({})", removed.id, removed.name);
    Ok(())
}

/// Print validation issues. With `repair`, rebuild the state index first.
/// Fails when issues remain, so scripts can gate on the exit status.
pub async fn run_validate(config: &Config, repair: bool) -> Result<()> {
    let mut directory = open_directory(config).await?;

    if repair {
        directory.rebuild_index().await?;
        println!("Rebuilt state index from {} builder(s).", directory.len());
    }

    let report = directory.validate();
    if report.is_valid {
        println!("ok: {} builder(s), no issues", directory.len());
        return Ok(());
    }

    println!("{} issue(s):", report.issues.len());
    for issue in &report.issues {
        println!("  - {}", issue);
    }
    anyhow::bail!("validation failed with {} issue(s)", report.issues.len())
}

pub async fn run_restore(config: &Config) -> Result<()> {
    let mut directory = open_directory(config).await?;
    match directory.restore_latest_backup().await? {
        Some(label) => {
            println!("Restored {} builder(s) from {}", directory.len(), label);
        }
        None => {
            println!("No backups found in {}", config.store.backup_dir().display());
        }
    }
    Ok(())
}
