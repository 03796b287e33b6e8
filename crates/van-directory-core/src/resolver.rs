//! Coordinate resolution for `(city, state)` pairs.
//!
//! Resolution never fails. It walks a fallback chain and reports which
//! level answered:
//!
//! 1. Static city table, keyed by normalized `"city, state"`.
//! 2. Optional [`Geocoder`] (only via [`resolve_with_geocoder`]).
//! 3. Static state-center table (full name or two-letter code, any case).
//! 4. Geographic center of the contiguous US, [`US_CENTER`].

use async_trait::async_trait;
use serde::Serialize;

use crate::models::Coordinate;
use crate::tables::{CITY_COORDINATES, STATE_CENTERS};

/// Geographic center of the contiguous United States.
pub const US_CENTER: Coordinate = Coordinate::new(39.8283, -98.5795);

/// Which level of the fallback chain produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// The record carried its own valid coordinate.
    Exact,
    City,
    Geocoded,
    State,
    Country,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Exact => "exact",
            Precision::City => "city",
            Precision::Geocoded => "geocoded",
            Precision::State => "state",
            Precision::Country => "country",
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolved {
    pub coordinate: Coordinate,
    pub precision: Precision,
}

/// External address lookup used when the static city table misses.
///
/// Implementations should enforce their own timeout. Any error is absorbed
/// by the resolver and never reaches its caller.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> anyhow::Result<Coordinate>;
}

/// Lowercase, trim, drop `.`/`,`, and collapse whitespace.
///
/// `"  St. Louis "` and `"st louis"` normalize to the same key.
pub fn normalize_city(city: &str) -> String {
    city.to_lowercase()
        .replace(['.', ','], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical state name for a full name or two-letter code, any case.
pub fn canonical_state(state: &str) -> Option<&'static str> {
    let wanted = state.split_whitespace().collect::<Vec<_>>().join(" ");
    if wanted.is_empty() {
        return None;
    }
    STATE_CENTERS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(&wanted) || s.abbr.eq_ignore_ascii_case(&wanted))
        .map(|s| s.name)
}

/// Center coordinate of a recognized state.
pub fn state_center(state: &str) -> Option<Coordinate> {
    let name = canonical_state(state)?;
    STATE_CENTERS
        .iter()
        .find(|s| s.name == name)
        .map(|s| Coordinate::new(s.lat, s.lng))
}

/// Static city lookup only.
pub fn city_coordinate(city: &str, state: &str) -> Option<Coordinate> {
    let city = normalize_city(city);
    if city.is_empty() {
        return None;
    }
    let state = canonical_state(state)?;
    CITY_COORDINATES
        .iter()
        .find(|c| c.city == city && c.state == state)
        .map(|c| Coordinate::new(c.lat, c.lng))
}

/// Resolve to a coordinate; see the module docs for the chain.
pub fn resolve(city: &str, state: &str) -> Coordinate {
    resolve_detailed(city, state).coordinate
}

pub fn resolve_detailed(city: &str, state: &str) -> Resolved {
    if let Some(coordinate) = city_coordinate(city, state) {
        return Resolved {
            coordinate,
            precision: Precision::City,
        };
    }
    fallback(state)
}

/// Like [`resolve_detailed`], but consults `geocoder` between the city
/// table and the state center. `query` is the free-text address handed to
/// the geocoder; when blank, `"city, state"` is used.
pub async fn resolve_with_geocoder<G>(
    geocoder: Option<&G>,
    query: &str,
    city: &str,
    state: &str,
) -> Resolved
where
    G: Geocoder + ?Sized,
{
    if let Some(coordinate) = city_coordinate(city, state) {
        return Resolved {
            coordinate,
            precision: Precision::City,
        };
    }

    if let Some(geocoder) = geocoder {
        let query = if query.trim().is_empty() {
            format!("{}, {}", city.trim(), state.trim())
        } else {
            query.trim().to_string()
        };
        if query.trim_matches([',', ' ']).is_empty() {
            return fallback(state);
        }
        if let Ok(coordinate) = geocoder.geocode(&query).await {
            if coordinate.is_valid() {
                return Resolved {
                    coordinate,
                    precision: Precision::Geocoded,
                };
            }
        }
    }

    fallback(state)
}

fn fallback(state: &str) -> Resolved {
    match state_center(state) {
        Some(coordinate) => Resolved {
            coordinate,
            precision: Precision::State,
        },
        None => Resolved {
            coordinate: US_CENTER,
            precision: Precision::Country,
        },
    }
}
