//! Great-circle distance.
//!
//! The single distance implementation used by proximity search, zip search,
//! and radius filtering. Earth radius is fixed at 3958.8 statute miles (mean
//! radius); every distance the directory reports is computed with it.

use crate::models::Coordinate;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance in miles between two points given in decimal degrees.
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// [`haversine_miles`] over two [`Coordinate`]s.
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    haversine_miles(a.lat, a.lng, b.lat, b.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: Coordinate = Coordinate::new(40.7128, -74.0060);
    const LOS_ANGELES: Coordinate = Coordinate::new(34.0522, -118.2437);

    #[test]
    fn identical_points_are_zero() {
        for &(lat, lng) in &[(0.0, 0.0), (40.7128, -74.006), (-33.9, 151.2), (89.9, 179.9)] {
            assert_eq!(haversine_miles(lat, lng, lat, lng), 0.0);
        }
    }

    #[test]
    fn symmetric() {
        let ab = distance_miles(NEW_YORK, LOS_ANGELES);
        let ba = distance_miles(LOS_ANGELES, NEW_YORK);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn new_york_to_los_angeles() {
        let d = distance_miles(NEW_YORK, LOS_ANGELES);
        assert!((d - 2445.0).abs() <= 10.0, "got {}", d);
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = haversine_miles(0.0, 0.0, 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_MILES;
        assert!((d - half).abs() < 1e-6);
    }

    #[test]
    fn never_negative() {
        let d = haversine_miles(10.0, 20.0, -10.0, -20.0);
        assert!(d > 0.0);
    }
}
