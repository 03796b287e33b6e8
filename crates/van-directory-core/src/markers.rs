//! Map marker placement.
//!
//! Each record gets a base coordinate (its own when valid, otherwise the
//! resolver's answer for its city and state). Records sharing a base
//! coordinate are numbered in input order and spread out with
//! [`offset`](crate::offset::offset). Counters are local to one call, so the
//! same ordered input always produces the same placements.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{BuilderId, BuilderRecord, Coordinate};
use crate::offset::{offset, OffsetStrategy};
use crate::resolver::{resolve_detailed, Precision, Resolved};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: BuilderId,
    pub name: String,
    /// Where the marker is drawn.
    pub position: Coordinate,
    /// Where the record actually resolves to.
    pub base: Coordinate,
    pub precision: Precision,
    /// Index within the group sharing `base`.
    pub group_index: usize,
}

/// The record's own coordinate, or the resolver chain for its city/state.
pub fn base_coordinate(record: &BuilderRecord) -> Resolved {
    match record.coordinate() {
        Some(coordinate) => Resolved {
            coordinate,
            precision: Precision::Exact,
        },
        None => resolve_detailed(record.city(), record.state()),
    }
}

/// Grouping key for a base coordinate, at roughly 10 cm resolution.
pub fn coordinate_key(c: Coordinate) -> String {
    format!("{:.6},{:.6}", c.lat, c.lng)
}

pub fn place_markers(records: &[BuilderRecord], strategy: OffsetStrategy) -> Vec<Marker> {
    let mut group_counts: HashMap<String, usize> = HashMap::new();
    records
        .iter()
        .map(|record| {
            let resolved = base_coordinate(record);
            let counter = group_counts
                .entry(coordinate_key(resolved.coordinate))
                .or_insert(0);
            let group_index = *counter;
            *counter += 1;
            Marker {
                id: record.id.clone(),
                name: record.name.clone(),
                position: offset(resolved.coordinate, group_index, strategy),
                base: resolved.coordinate,
                precision: resolved.precision,
                group_index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn rec(id: &str, city: &str, state: &str, coord: Option<(f64, f64)>) -> BuilderRecord {
        BuilderRecord {
            id: id.into(),
            name: format!("Builder {}", id),
            location: Some(Location {
                lat: coord.map(|c| c.0),
                lng: coord.map(|c| c.1),
                city: city.into(),
                state: state.into(),
                zip: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn shared_city_gets_distinct_positions() {
        let records = vec![
            rec("1", "Denver", "Colorado", None),
            rec("2", "Denver", "Colorado", None),
            rec("3", "Denver", "Colorado", None),
        ];
        let markers = place_markers(&records, OffsetStrategy::Circular);
        assert_eq!(markers.len(), 3);
        assert!(markers.iter().all(|m| m.precision == Precision::City));
        assert_eq!(
            markers.iter().map(|m| m.group_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_ne!(markers[0].position, markers[1].position);
        assert_ne!(markers[1].position, markers[2].position);
        assert!(markers.iter().all(|m| m.base == markers[0].base));
    }

    #[test]
    fn groups_are_independent() {
        let records = vec![
            rec("1", "Denver", "Colorado", None),
            rec("2", "Boulder", "Colorado", None),
            rec("3", "Denver", "Colorado", None),
        ];
        let markers = place_markers(&records, OffsetStrategy::Linear);
        assert_eq!(markers[0].group_index, 0);
        assert_eq!(markers[1].group_index, 0);
        assert_eq!(markers[2].group_index, 1);
    }

    #[test]
    fn own_coordinate_wins() {
        let records = vec![rec("1", "Denver", "Colorado", Some((39.5, -105.5)))];
        let markers = place_markers(&records, OffsetStrategy::Circular);
        assert_eq!(markers[0].precision, Precision::Exact);
        assert_eq!(markers[0].position, Coordinate::new(39.5, -105.5));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let records = vec![
            rec("1", "Nowhere", "New Jersey", None),
            rec("2", "Elsewhere", "New Jersey", None),
            rec("3", "Trenton", "NJ", None),
        ];
        let a = place_markers(&records, OffsetStrategy::Circular);
        let b = place_markers(&records, OffsetStrategy::Circular);
        assert_eq!(a, b);
        // The two unknown cities share the state center.
        assert_eq!(a[1].group_index, 1);
    }
}
