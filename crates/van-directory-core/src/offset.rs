//! Marker offsetting for records that share a coordinate.
//!
//! Pure and stateless: callers pass the record's index within its group.
//! [`crate::markers::place_markers`] derives those indices per call.

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

/// Radius of the first ring in degrees (about half a mile).
pub const RING_RADIUS_DEGREES: f64 = 0.008;
/// Angular slots per ring, spaced 60° apart.
pub const SLOTS_PER_RING: usize = 6;
/// Step per index for [`OffsetStrategy::Linear`].
pub const LINEAR_STEP_DEGREES: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetStrategy {
    /// Index 0 keeps the base coordinate. Index `k >= 1` sits on ring
    /// `ceil(k / 6)` at angle `((k - 1) mod 6) * 60°`; each further ring
    /// adds another [`RING_RADIUS_DEGREES`].
    #[default]
    Circular,
    /// `lat += k * 0.005`, `lng += k * 0.005`.
    Linear,
}

/// Position of the `index`-th record sharing `base`.
pub fn offset(base: Coordinate, index: usize, strategy: OffsetStrategy) -> Coordinate {
    if index == 0 {
        return base;
    }
    let (dlat, dlng) = match strategy {
        OffsetStrategy::Circular => {
            let ring = (index - 1) / SLOTS_PER_RING + 1;
            let slot = (index - 1) % SLOTS_PER_RING;
            let radius = RING_RADIUS_DEGREES * ring as f64;
            let angle = (slot as f64 * 360.0 / SLOTS_PER_RING as f64).to_radians();
            (radius * angle.cos(), radius * angle.sin())
        }
        OffsetStrategy::Linear => {
            let step = LINEAR_STEP_DEGREES * index as f64;
            (step, step)
        }
    };
    Coordinate::new(
        (base.lat + dlat).clamp(-90.0, 90.0),
        wrap_longitude(base.lng + dlng),
    )
}

fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}
