//! Attribute search and proximity search over the directory.
//!
//! Used by both the `vandir search` / `vandir near` commands and the
//! `GET /builders` / `GET /builders/near` endpoints.

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use van_directory_core::error::OriginError;
use van_directory_core::models::{BuilderRecord, Coordinate, SearchQuery};
use van_directory_core::proximity::{find_near_origin, locate_origin, OriginSpec};
use van_directory_core::resolver::Geocoder;

use crate::backend::open_directory;
use crate::config::Config;
use crate::geocode;

/// Why a near-query could not run.
#[derive(Debug, Error)]
pub enum NearError {
    #[error(transparent)]
    Origin(#[from] OriginError),

    #[error("radius must be a positive number of miles")]
    Radius,
}

/// Response shape for a proximity search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearResults {
    pub origin: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_zip: Option<String>,
    pub radius_miles: f64,
    pub count: usize,
    pub builders: Vec<BuilderRecord>,
}

/// Locate the origin and run the proximity filter.
///
/// When `radius` is omitted, zip queries use `search.zip_radius_miles` and
/// everything else `search.default_radius_miles`.
pub async fn near<G>(
    config: &Config,
    records: &[BuilderRecord],
    query: &OriginSpec,
    radius: Option<f64>,
    geocoder: Option<&G>,
) -> Result<NearResults, NearError>
where
    G: Geocoder + ?Sized,
{
    let radius_miles = match radius {
        Some(r) if r.is_finite() && r > 0.0 => r,
        Some(_) => return Err(NearError::Radius),
        None if query.is_zip() => config.search.zip_radius_miles,
        None => config.search.default_radius_miles,
    };

    let origin = locate_origin(query, records, geocoder).await?;
    let builders = find_near_origin(&origin, radius_miles, records);

    Ok(NearResults {
        origin: origin.coordinate,
        origin_zip: origin.zip,
        radius_miles,
        count: builders.len(),
        builders,
    })
}

/// Apply the configured default limit when the query carries none.
pub fn with_default_limit(config: &Config, mut query: SearchQuery) -> SearchQuery {
    if query.limit.is_none() {
        query.limit = Some(config.search.default_limit);
    }
    query
}

fn print_builder_line(r: &BuilderRecord) {
    let place = match (r.city(), r.state()) {
        ("", "") => "(no location)".to_string(),
        ("", state) => state.to_string(),
        (city, "") => city.to_string(),
        (city, state) => format!("{}, {}", city, state),
    };
    println!("  {:<8} {:<36} {}", r.id, r.name, place);
}

/// CLI entry point for `vandir search`.
pub async fn run_search(config: &Config, query: SearchQuery) -> Result<()> {
    let directory = open_directory(config).await?;
    let query = with_default_limit(config, query);
    let results = directory.search(&query);

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("{} builder(s):", results.len());
    for r in results {
        print_builder_line(r);
    }
    Ok(())
}

/// CLI entry point for `vandir near`.
pub async fn run_near(config: &Config, query: OriginSpec, radius: Option<f64>) -> Result<()> {
    let directory = open_directory(config).await?;
    let geocoder = geocode::from_config(&config.geocoding)?;
    let results = near(config, directory.records(), &query, radius, geocoder.as_ref()).await?;

    println!(
        "Origin {:.4}, {:.4}{} within {} miles: {} builder(s)",
        results.origin.lat,
        results.origin.lng,
        results
            .origin_zip
            .as_deref()
            .map(|z| format!(" (zip {})", z))
            .unwrap_or_default(),
        results.radius_miles,
        results.count
    );
    for r in &results.builders {
        let miles = r
            .distance_from_query
            .as_ref()
            .map(|d| d.miles)
            .unwrap_or_default();
        println!("  {:>7.1} mi  {:<8} {}", miles, r.id, r.name);
    }
    Ok(())
}
