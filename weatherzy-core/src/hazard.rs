//! Live hazard layer fed by a public GeoJSON event feed (GDACS cyclones).

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::{Endpoint, GatewayError},
    model::{Coordinate, HazardEvent},
};

/// Radius of the halo drawn around every hazard marker.
pub const HALO_RADIUS_METERS: u32 = 100_000;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Properties {
    eventname: Option<String>,
    episodeid: Option<u64>,
    severitydata: Option<SeverityData>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeverityData {
    severity: Option<f64>,
}

/// Parse a feature collection. Features that are malformed or lack a point
/// position are skipped one by one; the rest of the layer still loads.
pub fn parse_feed(body: &str) -> Result<Vec<HazardEvent>, GatewayError> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| GatewayError::invalid_payload(Endpoint::HazardFeed, e.to_string()))?;

    Ok(collection.features.unwrap_or_default().into_iter().filter_map(to_event).collect())
}

fn to_event(raw: serde_json::Value) -> Option<HazardEvent> {
    let feature: Feature = match serde_json::from_value(raw) {
        Ok(feature) => feature,
        Err(e) => {
            debug!(error = %e, "malformed hazard feature skipped");
            return None;
        }
    };

    let properties = feature.properties?;
    let name = properties.eventname.unwrap_or_default();
    let Some(coordinate) = feature.geometry.as_ref().and_then(point_of) else {
        debug!(event = %name, "hazard feature without point geometry skipped");
        return None;
    };

    Some(HazardEvent {
        name,
        coordinate,
        severity: properties.severitydata.and_then(|s| s.severity).unwrap_or_default(),
        episode_id: properties.episodeid.unwrap_or_default(),
        country: properties.country.unwrap_or_default(),
    })
}

/// GeoJSON positions are `[longitude, latitude]`.
fn point_of(geometry: &Geometry) -> Option<Coordinate> {
    let pair = geometry.coordinates.as_array()?;
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Some(Coordinate::new(lat, lon))
}

#[derive(Debug, Clone)]
pub struct HazardFeed {
    http: Client,
    url: String,
}

impl HazardFeed {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    async fn try_fetch(&self) -> Result<Vec<HazardEvent>, GatewayError> {
        let endpoint = Endpoint::HazardFeed;
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(endpoint, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| GatewayError::from_reqwest(endpoint, e))?;
        if !status.is_success() {
            return Err(GatewayError::network(endpoint, format!("status {status}")));
        }

        parse_feed(&body)
    }

    /// Fetch current hazards. Failures are logged and yield an empty layer.
    pub async fn fetch(&self) -> Vec<HazardEvent> {
        match self.try_fetch().await {
            Ok(events) => {
                info!(count = events.len(), "hazard feed loaded");
                events
            }
            Err(e) => {
                warn!(error = %e, "hazard feed unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [88.5, 21.2] },
                "properties": {
                    "eventname": "REMAL-24",
                    "episodeid": 17,
                    "severitydata": { "severity": 120.5, "severityunit": "km/h" },
                    "country": "Bangladesh"
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[1.0, 2.0], [3.0, 4.0]]] },
                "properties": { "eventname": "TRACK", "episodeid": 3 }
            }
        ]
    }"#;

    #[test]
    fn parses_points_and_swaps_geojson_order() {
        let events = parse_feed(FEED).expect("feed should parse");

        assert_eq!(events.len(), 1);
        let remal = &events[0];
        assert_eq!(remal.name, "REMAL-24");
        assert_eq!(remal.coordinate, Coordinate::new(21.2, 88.5));
        assert_eq!(remal.severity, 120.5);
        assert_eq!(remal.episode_id, 17);
        assert_eq!(remal.country, "Bangladesh");
    }

    #[test]
    fn null_fields_and_bad_features_do_not_drop_the_layer() {
        let body = r#"{
            "features": [
                {
                    "geometry": { "type": "Point", "coordinates": [88.5, 21.2] },
                    "properties": { "eventname": "REMAL-24", "episodeid": 17, "country": "Bangladesh" }
                },
                {
                    "geometry": { "type": "Point", "coordinates": [120.1, 15.3] },
                    "properties": {
                        "eventname": null,
                        "episodeid": null,
                        "severitydata": { "severity": null },
                        "country": null
                    }
                },
                {
                    "geometry": { "type": "Point", "coordinates": [10.0, 10.0] },
                    "properties": { "eventname": "BROKEN", "episodeid": "seven" }
                }
            ]
        }"#;

        let events = parse_feed(body).expect("feed should parse");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "REMAL-24");
        assert_eq!(events[0].severity, 0.0);
        assert_eq!(events[1].coordinate, Coordinate::new(15.3, 120.1));
        assert_eq!(events[1].name, "");
        assert_eq!(events[1].country, "");
        assert_eq!(events[1].episode_id, 0);
    }

    #[test]
    fn malformed_feed_is_invalid_payload() {
        let err = parse_feed("<html>").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidPayload { endpoint: Endpoint::HazardFeed, .. }));
    }

    #[test]
    fn empty_collection_is_empty_layer() {
        assert!(parse_feed(r#"{"type":"FeatureCollection"}"#).unwrap().is_empty());
    }
}
