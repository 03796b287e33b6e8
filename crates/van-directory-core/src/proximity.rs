//! Proximity search: filter records to a radius around an origin and sort
//! them closest first.

use serde::Deserialize;

use crate::error::OriginError;
use crate::geo::distance_miles;
use crate::models::{BuilderRecord, Coordinate, DistanceFromQuery};
use crate::resolver::{resolve_with_geocoder, Geocoder};

/// The point a proximity query is measured from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOrigin {
    pub coordinate: Coordinate,
    /// Set when the origin came from a zip code lookup.
    pub zip: Option<String>,
}

impl QueryOrigin {
    pub fn point(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            zip: None,
        }
    }
}

/// Records within `radius_miles` of `origin`, closest first.
pub fn find_near(
    origin: Coordinate,
    radius_miles: f64,
    records: &[BuilderRecord],
) -> Vec<BuilderRecord> {
    find_near_origin(&QueryOrigin::point(origin), radius_miles, records)
}

/// Like [`find_near`], recording the origin zip in each annotation.
///
/// Records without a valid `location.lat`/`location.lng` are skipped. Ties
/// keep input order. Inputs are cloned, never mutated.
pub fn find_near_origin(
    origin: &QueryOrigin,
    radius_miles: f64,
    records: &[BuilderRecord],
) -> Vec<BuilderRecord> {
    let mut hits: Vec<(f64, &BuilderRecord)> = records
        .iter()
        .filter_map(|r| {
            let here = r.coordinate()?;
            let miles = distance_miles(origin.coordinate, here);
            (miles <= radius_miles).then_some((miles, r))
        })
        .collect();

    // `sort_by` is stable, so equal distances keep input order.
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    hits.into_iter()
        .map(|(miles, r)| {
            let mut out = r.clone();
            out.distance_from_query = Some(DistanceFromQuery {
                miles,
                origin_zip: origin.zip.clone(),
                origin_lat_lng: Some(origin.coordinate),
            });
            out
        })
        .collect()
}

/// First five characters of a zip (drops any `+4` suffix).
fn zip5(zip: &str) -> &str {
    let zip = zip.trim();
    zip.split('-').next().unwrap_or(zip).trim()
}

/// Coordinate of the first record whose `location.zip` matches `zip`.
pub fn origin_for_zip(records: &[BuilderRecord], zip: &str) -> Option<Coordinate> {
    let wanted = zip5(zip);
    if wanted.is_empty() {
        return None;
    }
    records.iter().find_map(|r| {
        let loc = r.location.as_ref()?;
        let z = loc.zip.as_deref()?;
        if zip5(z) == wanted {
            loc.coordinate()
        } else {
            None
        }
    })
}

/// How a caller describes the origin of a near-query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OriginSpec {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl OriginSpec {
    pub fn is_zip(&self) -> bool {
        self.lat.is_none() && self.lng.is_none() && non_blank(&self.zip).is_some()
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Turn an [`OriginSpec`] into a [`QueryOrigin`].
///
/// Order: explicit lat/lng; zip (known record zips, then the geocoder, then
/// the resolver when a state was also given); city/state through the
/// resolver chain. Geocoder failures are absorbed.
pub async fn locate_origin<G>(
    query: &OriginSpec,
    records: &[BuilderRecord],
    geocoder: Option<&G>,
) -> Result<QueryOrigin, OriginError>
where
    G: Geocoder + ?Sized,
{
    if let (Some(lat), Some(lng)) = (query.lat, query.lng) {
        let c = Coordinate::new(lat, lng);
        if !c.is_valid() {
            return Err(OriginError::InvalidCoordinate { lat, lng });
        }
        return Ok(QueryOrigin::point(c));
    }

    let city = non_blank(&query.city).unwrap_or("");
    let state = non_blank(&query.state);

    if let Some(zip) = non_blank(&query.zip) {
        let zip = zip5(zip).to_string();
        if let Some(coordinate) = origin_for_zip(records, &zip) {
            return Ok(QueryOrigin {
                coordinate,
                zip: Some(zip),
            });
        }
        if let Some(geocoder) = geocoder {
            if let Ok(coordinate) = geocoder.geocode(&zip).await {
                if coordinate.is_valid() {
                    return Ok(QueryOrigin {
                        coordinate,
                        zip: Some(zip),
                    });
                }
            }
        }
        return match state {
            Some(state) => {
                let resolved = resolve_with_geocoder::<G>(None, "", city, state).await;
                Ok(QueryOrigin {
                    coordinate: resolved.coordinate,
                    zip: Some(zip),
                })
            }
            None => Err(OriginError::UnknownZip(zip)),
        };
    }

    match state {
        Some(state) => {
            let resolved = resolve_with_geocoder(geocoder, "", city, state).await;
            Ok(QueryOrigin::point(resolved.coordinate))
        }
        None => Err(OriginError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::resolver::state_center;
    use async_trait::async_trait;

    fn at(id: &str, lat: f64, lng: f64) -> BuilderRecord {
        BuilderRecord {
            id: id.into(),
            name: id.into(),
            location: Some(Location {
                lat: Some(lat),
                lng: Some(lng),
                city: "X".into(),
                state: "New Jersey".into(),
                zip: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn includes_iff_within_radius_and_sorted() {
        let origin = Coordinate::new(40.0, -74.0);
        let records = vec![
            at("far", 41.0, -74.0),
            at("near", 40.05, -74.0),
            at("mid", 40.3, -74.0),
            at("origin", 40.0, -74.0),
        ];
        let radius = 30.0;
        let out = find_near(origin, radius, &records);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["origin", "near", "mid"]);

        for r in &records {
            let d = distance_miles(origin, r.coordinate().unwrap());
            assert_eq!(d <= radius, ids.contains(&r.id.as_str()));
        }
        let miles: Vec<f64> = out
            .iter()
            .map(|r| r.distance_from_query.as_ref().unwrap().miles)
            .collect();
        assert!(miles.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(miles[0], 0.0);
    }

    #[test]
    fn skips_records_without_coordinates() {
        let mut no_coord = at("none", 0.0, 0.0);
        no_coord.location.as_mut().unwrap().lat = None;
        let mut no_location = at("nothing", 0.0, 0.0);
        no_location.location = None;
        let out = find_near(Coordinate::new(0.0, 0.0), 10_000.0, &[no_coord, no_location]);
        assert!(out.is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![at("b", 40.1, -74.0), at("a", 40.1, -74.0), at("c", 40.1, -74.0)];
        let out = find_near(Coordinate::new(40.0, -74.0), 50.0, &records);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn does_not_mutate_input() {
        let records = vec![at("a", 40.0, -74.0)];
        let before = records.clone();
        let out = find_near(Coordinate::new(40.0, -74.0), 5.0, &records);
        assert_eq!(records, before);
        assert!(records[0].distance_from_query.is_none());
        assert!(out[0].distance_from_query.is_some());
    }

    #[test]
    fn empty_input() {
        assert!(find_near(Coordinate::new(40.0, -74.0), 10.0, &[]).is_empty());
    }

    #[test]
    fn zip_lookup_from_records() {
        let mut r = at("a", 40.35, -74.65);
        r.location.as_mut().unwrap().zip = Some("08540-1234".into());
        assert_eq!(
            origin_for_zip(&[r], "08540"),
            Some(Coordinate::new(40.35, -74.65))
        );
    }

    struct Fixed(Coordinate);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn geocode(&self, _q: &str) -> anyhow::Result<Coordinate> {
            Ok(self.0)
        }
    }

    struct Down;

    #[async_trait]
    impl Geocoder for Down {
        async fn geocode(&self, _q: &str) -> anyhow::Result<Coordinate> {
            anyhow::bail!("unreachable")
        }
    }

    #[tokio::test]
    async fn locate_by_lat_lng() {
        let query = OriginSpec {
            lat: Some(40.0),
            lng: Some(-74.0),
            ..Default::default()
        };
        let o = locate_origin::<Down>(&query, &[], None).await.unwrap();
        assert_eq!(o, QueryOrigin::point(Coordinate::new(40.0, -74.0)));

        let bad = OriginSpec {
            lat: Some(91.0),
            lng: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            locate_origin::<Down>(&bad, &[], None).await,
            Err(OriginError::InvalidCoordinate { .. })
        ));
    }

    #[tokio::test]
    async fn locate_zip_via_geocoder() {
        let query = OriginSpec {
            zip: Some("80202".into()),
            ..Default::default()
        };
        let g = Fixed(Coordinate::new(39.75, -105.0));
        let o = locate_origin(&query, &[], Some(&g)).await.unwrap();
        assert_eq!(o.zip.as_deref(), Some("80202"));
        assert_eq!(o.coordinate, Coordinate::new(39.75, -105.0));
    }

    #[tokio::test]
    async fn zip_failure_falls_back_to_state_or_errors() {
        let query = OriginSpec {
            zip: Some("99999".into()),
            state: Some("New Jersey".into()),
            ..Default::default()
        };
        let o = locate_origin(&query, &[], Some(&Down)).await.unwrap();
        assert_eq!(o.coordinate, state_center("New Jersey").unwrap());

        let query = OriginSpec {
            zip: Some("99999".into()),
            ..Default::default()
        };
        assert_eq!(
            locate_origin(&query, &[], Some(&Down)).await,
            Err(OriginError::UnknownZip("99999".into()))
        );
    }

    #[tokio::test]
    async fn nothing_to_locate() {
        assert_eq!(
            locate_origin::<Down>(&OriginSpec::default(), &[], None).await,
            Err(OriginError::Missing)
        );
    }
}
