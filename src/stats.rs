//! Directory statistics.
//!
//! A quick summary of what the store holds: totals, how many records can
//! be placed precisely on a map, and per-state counts from the index.

use anyhow::Result;

use van_directory_core::index::state_counts;

use crate::backend::open_directory;
use crate::config::{Backend, Config};

/// Run the stats command: load the directory and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let directory = open_directory(config).await?;
    let records = directory.records();

    let with_coordinates = records.iter().filter(|r| r.coordinate().is_some()).count();
    let with_gallery = records.iter().filter(|r| !r.gallery.is_empty()).count();
    let store_size = std::fs::metadata(&config.store.path)
        .map(|m| m.len())
        .unwrap_or(0);
    let backend = match config.store.backend {
        Backend::Json => "json",
        Backend::Sqlite => "sqlite",
    };

    println!("Van Directory Stats");
    println!("===================");
    println!();
    println!("  Store:       {} ({})", config.store.path.display(), backend);
    println!("  Size:        {}", format_bytes(store_size));
    println!();
    println!("  Builders:    {}", records.len());
    println!(
        "  Geolocated:  {} / {} ({}%)",
        with_coordinates,
        records.len(),
        percent(with_coordinates, records.len())
    );
    println!("  Galleries:   {}", with_gallery);
    println!("  States:      {}", directory.by_state().len());

    let counts = state_counts(directory.by_state());
    if !counts.is_empty() {
        let mut rows: Vec<(&str, usize)> = counts.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        println!();
        println!("  By state:");
        println!("  {:<24} {:>8}", "STATE", "BUILDERS");
        println!("  {}", "-".repeat(33));
        for (state, count) in rows {
            println!("  {:<24} {:>8}", state, count);
        }
    }

    println!();
    Ok(())
}

fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 {
        0
    } else {
        part * 100 / whole
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
