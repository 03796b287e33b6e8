//! Export the directory as a single JSON document.
//!
//! Produces `{ builders, buildersByState, lastUpdated }`, the same shape the
//! JSON store persists, so an export from the SQLite backend can seed a
//! JSON-backed deployment or a static site.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use van_directory_core::models::{BuilderRecord, StateIndex};

use crate::backend::open_directory;
use crate::config::Config;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData<'a> {
    builders: &'a [BuilderRecord],
    builders_by_state: &'a StateIndex,
    last_updated: String,
}

/// Export the directory as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let directory = open_directory(config).await?;

    let data = ExportData {
        builders: directory.records(),
        builders_by_state: directory.by_state(),
        last_updated: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    };
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Exported {} builders in {} states to {}",
                directory.len(),
                directory.by_state().len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
