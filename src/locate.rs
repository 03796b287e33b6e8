//! Coordinate resolution and map marker placement commands.

use anyhow::Result;

use van_directory_core::index::{canonical_state_key, state_key};
use van_directory_core::markers::{place_markers, Marker};
use van_directory_core::models::BuilderRecord;
use van_directory_core::offset::OffsetStrategy;
use van_directory_core::resolver::{resolve_with_geocoder, Resolved};

use crate::backend::open_directory;
use crate::config::Config;
use crate::geocode;

/// Markers for every record, or only those in `state` (any spelling the
/// index recognizes). Group indices are computed within the selection.
pub fn markers_for(
    records: &[BuilderRecord],
    state: Option<&str>,
    strategy: OffsetStrategy,
) -> Vec<Marker> {
    match state.map(str::trim).filter(|s| !s.is_empty()) {
        Some(state) => {
            let wanted = canonical_state_key(state);
            let selected: Vec<BuilderRecord> = records
                .iter()
                .filter(|r| state_key(r) == wanted)
                .cloned()
                .collect();
            place_markers(&selected, strategy)
        }
        None => place_markers(records, strategy),
    }
}

/// Resolve through the full chain, consulting the configured geocoder.
pub async fn resolve_place(config: &Config, city: &str, state: &str) -> Result<Resolved> {
    let geocoder = geocode::from_config(&config.geocoding)?;
    Ok(resolve_with_geocoder(geocoder.as_ref(), "", city, state).await)
}

pub async fn run_resolve(config: &Config, city: &str, state: &str) -> Result<()> {
    let resolved = resolve_place(config, city, state).await?;
    println!(
        "{:.4}, {:.4} ({})",
        resolved.coordinate.lat,
        resolved.coordinate.lng,
        resolved.precision
    );
    Ok(())
}

pub async fn run_markers(config: &Config, state: Option<&str>, json: bool) -> Result<()> {
    let directory = open_directory(config).await?;
    let markers = markers_for(directory.records(), state, config.map.offset);

    if json {
        println!("{}", serde_json::to_string_pretty(&markers)?);
        return Ok(());
    }

    println!("{} marker(s):", markers.len());
    for m in &markers {
        println!(
            "  {:<8} {:>10.5} {:>11.5}  {:<8} #{}  {}",
            m.id,
            m.position.lat,
            m.position.lng,
            m.precision.as_str(),
            m.group_index,
            m.name
        );
    }
    Ok(())
}
