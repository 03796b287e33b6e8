//! HTTP geocoding against a Nominatim-compatible search endpoint.
//!
//! Requests look like `GET {endpoint}?q=...&format=json&limit=1&countrycodes=us`
//! and the first hit's `lat`/`lon` (decimal strings) become the coordinate.
//! The client carries the configured timeout and user agent. Callers reach
//! this only through the resolver chain, which absorbs every error here.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use van_directory_core::models::Coordinate;
use van_directory_core::resolver::Geocoder;

use crate::config::GeocodingConfig;

pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

/// The configured geocoder, or `None` when geocoding is disabled.
pub fn from_config(config: &GeocodingConfig) -> Result<Option<HttpGeocoder>> {
    if !config.is_enabled() {
        return Ok(None);
    }
    HttpGeocoder::new(config).map(Some)
}

/// First hit of a Nominatim search response.
fn parse_nominatim_response(json: &serde_json::Value) -> Result<Coordinate> {
    let Some(first) = json.as_array().and_then(|hits| hits.first()) else {
        bail!("no geocoding results");
    };
    let field = |name: &str| -> Result<f64> {
        match first.get(name) {
            Some(serde_json::Value::String(s)) => Ok(s.trim().parse()?),
            Some(serde_json::Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("invalid {} in geocoding result", name)),
            _ => bail!("geocoding result is missing {}", name),
        }
    };
    let coordinate = Coordinate::new(field("lat")?, field("lon")?);
    if !coordinate.is_valid() {
        bail!("geocoding result out of range: {}, {}", coordinate.lat, coordinate.lng);
    }
    Ok(coordinate)
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<Coordinate> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "us"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(query, error = %e, "geocoding request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(query, %status, "geocoding request rejected");
            bail!("geocoding API error {}", status);
        }

        let json: serde_json::Value = response.json().await?;
        parse_nominatim_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_coordinates() {
        let body = json!([{"lat": "39.7392358", "lon": "-104.990251", "display_name": "Denver"}]);
        let c = parse_nominatim_response(&body).unwrap();
        assert!((c.lat - 39.7392358).abs() < 1e-9);
        assert!((c.lng + 104.990251).abs() < 1e-9);
    }

    #[test]
    fn parses_numeric_coordinates() {
        let c = parse_nominatim_response(&json!([{"lat": 40.0, "lon": -74.5}])).unwrap();
        assert_eq!(c, Coordinate::new(40.0, -74.5));
    }

    #[test]
    fn rejects_empty_and_bad_results() {
        assert!(parse_nominatim_response(&json!([])).is_err());
        assert!(parse_nominatim_response(&json!({"error": "nope"})).is_err());
        assert!(parse_nominatim_response(&json!([{"lat": "abc", "lon": "1"}])).is_err());
        assert!(parse_nominatim_response(&json!([{"lat": "95", "lon": "1"}])).is_err());
    }

    #[test]
    fn disabled_provider_yields_none() {
        assert!(from_config(&GeocodingConfig::default()).unwrap().is_none());
    }
}
