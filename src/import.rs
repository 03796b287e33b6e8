//! Bulk import of builder records from JSON.
//!
//! Accepts either a bare array of records or a directory document
//! (`{"builders": [...]}`). Ids may be integers or strings and are
//! normalized to strings on the way in.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use van_directory_core::models::BuilderRecord;

use crate::backend::open_directory;
use crate::config::Config;

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Records(Vec<BuilderRecord>),
    Document { builders: Vec<BuilderRecord> },
}

/// Parse an import payload.
pub fn parse_import(content: &str) -> Result<Vec<BuilderRecord>> {
    let file: ImportFile = serde_json::from_str(content)
        .context("expected a JSON array of builders or an object with a \"builders\" array")?;
    Ok(match file {
        ImportFile::Records(records) => records,
        ImportFile::Document { builders } => builders,
    })
}

pub async fn run_import(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records =
        parse_import(&content).with_context(|| format!("Failed to parse {}", file.display()))?;
    let total = records.len();

    let mut directory = open_directory(config).await?;
    let report = directory.import(records).await?;

    tracing::info!(
        added = report.added.len(),
        skipped = report.skipped.len(),
        rejected = report.rejected.len(),
        "import finished"
    );

    println!("import {}", file.display());
    println!("  records read: {}", total);
    println!("  added: {}", report.added.len());
    println!("  skipped (existing id): {}", report.skipped.len());
    for id in &report.skipped {
        println!("    - {}", id);
    }
    println!("  rejected: {}", report.rejected.len());
    for (position, fields) in &report.rejected {
        println!("    - record #{}: {}", position + 1, fields.join(", "));
    }
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_array_or_document() {
        let a = parse_import(r#"[{"id": 3, "name": "A"}]"#).unwrap();
        assert_eq!(a[0].id, "3");
        let b = parse_import(r#"{"builders": [{"id": "x", "name": "B"}], "lastUpdated": "t"}"#)
            .unwrap();
        assert_eq!(b[0].id, "x");
        assert!(parse_import(r#"{"nope": 1}"#).is_err());
    }
}
