//! JSON document [`Store`].
//!
//! The whole directory lives in one file:
//!
//! ```json
//! { "builders": [...], "buildersByState": {...}, "lastUpdated": "2025-03-01T12:00:00Z" }
//! ```
//!
//! Saves write a sibling temp file and rename it over the document, so a
//! crash mid-write leaves the previous document intact. Backups are plain
//! copies under the backup directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use van_directory_core::models::{BuilderRecord, StateIndex};
use van_directory_core::store::{Snapshot, Store};

use crate::backup::{backup_path, ensure_dir, latest_backup};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    builders: &'a [BuilderRecord],
    builders_by_state: &'a StateIndex,
    last_updated: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(default)]
    builders: Vec<BuilderRecord>,
    #[serde(default)]
    builders_by_state: StateIndex,
}

pub struct JsonFileStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Write an empty document unless one already exists.
    pub async fn init(&self) -> Result<bool> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.save(&[], &StateIndex::new()).await?;
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "builders.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn replace_with(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Parse a directory document.
pub fn parse_document(content: &str) -> Result<Snapshot> {
    let doc: DocumentIn = serde_json::from_str(content)?;
    Ok(Snapshot {
        builders: doc.builders,
        builders_by_state: doc.builders_by_state,
    })
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self) -> Result<Snapshot> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Snapshot::default());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        parse_document(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    async fn save(&self, builders: &[BuilderRecord], by_state: &StateIndex) -> Result<()> {
        let doc = DocumentOut {
            builders,
            builders_by_state: by_state,
            last_updated: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        };
        let json = serde_json::to_vec_pretty(&doc)?;
        self.replace_with(&json).await?;
        tracing::debug!(
            path = %self.path.display(),
            builders = builders.len(),
            "saved directory document"
        );
        Ok(())
    }

    async fn backup(&self) -> Result<Option<String>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        ensure_dir(&self.backup_dir)?;
        let target = backup_path(&self.backup_dir, "json");
        tokio::fs::copy(&self.path, &target)
            .await
            .with_context(|| format!("Failed to back up to {}", target.display()))?;
        tracing::info!(backup = %target.display(), "backed up directory document");
        Ok(Some(target.display().to_string()))
    }

    async fn restore_latest(&self) -> Result<Option<String>> {
        let Some(latest) = latest_backup(&self.backup_dir, "json")? else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&latest)
            .await
            .with_context(|| format!("Failed to read {}", latest.display()))?;
        // Refuse to restore something that would not load.
        parse_document(&String::from_utf8_lossy(&bytes))
            .with_context(|| format!("Backup {} is not a directory document", latest.display()))?;
        self.backup().await?;
        self.replace_with(&bytes).await?;
        tracing::info!(backup = %latest.display(), "restored directory document");
        Ok(Some(latest.display().to_string()))
    }
}
