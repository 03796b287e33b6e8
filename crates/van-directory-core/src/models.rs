//! Core data models for the builder directory.
//!
//! Records are serialized in camelCase to match the JSON documents the
//! directory has always been published as (`vanTypes`, `socialMedia`,
//! `buildersByState`, ...).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

/// Builder ids are canonical strings. Ingested integer ids are converted
/// at deserialization time, see [`deserialize_id`].
pub type BuilderId = String;

/// Grouping key used for records without a usable `location.state`.
pub const UNKNOWN_STATE: &str = "Unknown";

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One conversion-company listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderRecord {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: BuilderId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub van_types: BTreeSet<String>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub services: BTreeSet<String>,
    #[serde(default)]
    pub certifications: BTreeSet<String>,
    #[serde(default)]
    pub social_media: BTreeMap<String, String>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    /// Attached by proximity search only. Stripped before every persist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_query: Option<DistanceFromQuery>,
}

impl BuilderRecord {
    /// The record's own coordinate, when it carries a valid one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.location.as_ref().and_then(Location::coordinate)
    }

    pub fn city(&self) -> &str {
        self.location.as_ref().map(|l| l.city.as_str()).unwrap_or("")
    }

    pub fn state(&self) -> &str {
        self.location.as_ref().map(|l| l.state.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Contact {
    /// True when at least one contact method is present and non-blank.
    pub fn has_any(&self) -> bool {
        [&self.phone, &self.email, &self.website]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub zip: Option<String>,
}

impl Location {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)).filter(Coordinate::is_valid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Distance annotation attached to proximity search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceFromQuery {
    pub miles: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_lat_lng: Option<Coordinate>,
}

/// Partial update. Absent fields are left untouched; `location` and
/// `contact` replace the stored value wholesale. Ids cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub van_types: Option<BTreeSet<String>>,
    #[serde(default)]
    pub amenities: Option<BTreeSet<String>>,
    #[serde(default)]
    pub services: Option<BTreeSet<String>>,
    #[serde(default)]
    pub certifications: Option<BTreeSet<String>>,
    #[serde(default)]
    pub social_media: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub gallery: Option<Vec<GalleryImage>>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

impl BuilderPatch {
    /// Merge present fields into `record`.
    pub fn apply_to(self, record: &mut BuilderRecord) {
        if let Some(v) = self.name {
            record.name = v;
        }
        if let Some(v) = self.address {
            record.address = Some(v);
        }
        if let Some(v) = self.contact {
            record.contact = v;
        }
        if let Some(v) = self.location {
            record.location = Some(v);
        }
        if let Some(v) = self.description {
            record.description = v;
        }
        if let Some(v) = self.van_types {
            record.van_types = v;
        }
        if let Some(v) = self.amenities {
            record.amenities = v;
        }
        if let Some(v) = self.services {
            record.services = v;
        }
        if let Some(v) = self.certifications {
            record.certifications = v;
        }
        if let Some(v) = self.social_media {
            record.social_media = v;
        }
        if let Some(v) = self.gallery {
            record.gallery = v;
        }
        if let Some(v) = self.price_range {
            record.price_range = Some(v);
        }
    }
}

/// One bucket of the denormalized per-state index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBucket {
    pub count: usize,
    #[serde(default)]
    pub builder_ids: Vec<BuilderId>,
}

/// `buildersByState`: state name to bucket, ordered by state name.
pub type StateIndex = BTreeMap<String, StateBucket>;

/// Query for [`Directory::search`](crate::directory::Directory::search).
/// All provided fields must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub van_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Result of [`Directory::validate`](crate::directory::Directory::validate).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl RawText {
    fn into_string(self) -> String {
        match self {
            RawText::Text(s) => s.trim().to_string(),
            RawText::Integer(n) => n.to_string(),
            RawText::Unsigned(n) => n.to_string(),
            RawText::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                (f as i64).to_string()
            }
            RawText::Float(f) => f.to_string(),
        }
    }
}

/// Accepts string or numeric ids (`7`, `"7"`, `"nj-1"`) and yields the
/// canonical string form. `null` becomes an empty id, to be allocated.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<BuilderId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawText>::deserialize(deserializer)?
        .map(RawText::into_string)
        .unwrap_or_default())
}

fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawText>::deserialize(deserializer)?
        .map(RawText::into_string)
        .filter(|s| !s.is_empty()))
}
