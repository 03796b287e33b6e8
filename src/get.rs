//! Builder retrieval by id, used by `vandir get`.

use anyhow::{bail, Result};

use van_directory_core::models::BuilderRecord;

use crate::backend::open_directory;
use crate::config::Config;

/// Look up one record.
pub async fn get_builder(config: &Config, id: &str) -> Result<BuilderRecord> {
    let directory = open_directory(config).await?;
    match directory.get(id) {
        Some(record) => Ok(record.clone()),
        None => bail!("builder not found: {}", id),
    }
}

fn join(set: &std::collections::BTreeSet<String>) -> String {
    if set.is_empty() {
        "-".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// CLI entry point: prints the record, then its raw JSON.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let b = get_builder(config, id).await?;

    println!("--- Builder ---");
    println!("id:             {}", b.id);
    println!("name:           {}", b.name);
    if let Some(ref address) = b.address {
        println!("address:        {}", address);
    }
    if let Some(ref loc) = b.location {
        println!("city/state:     {}, {}", loc.city, loc.state);
        if let Some(ref zip) = loc.zip {
            println!("zip:            {}", zip);
        }
        if let Some(c) = loc.coordinate() {
            println!("coordinates:    {:.5}, {:.5}", c.lat, c.lng);
        }
    }
    for (label, value) in [
        ("phone", &b.contact.phone),
        ("email", &b.contact.email),
        ("website", &b.contact.website),
    ] {
        if let Some(v) = value {
            println!("{:<15} {}", format!("{}:", label), v);
        }
    }
    println!("van types:      {}", join(&b.van_types));
    println!("services:       {}", join(&b.services));
    println!("amenities:      {}", join(&b.amenities));
    if let Some(range) = b.price_range {
        println!("price range:    ${:.0} - ${:.0}", range.min, range.max);
    }
    println!("gallery:        {} image(s)", b.gallery.len());
    println!();

    println!("--- JSON ---");
    println!("{}", serde_json::to_string_pretty(&b)?);

    Ok(())
}
