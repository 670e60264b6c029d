//! Integration tests for the IP location lookup and the hazard feed.

use reqwest::Client;
use serde_json::json;
use weatherzy_core::{
    Coordinate, LocationError,
    hazard::HazardFeed,
    location::{IpLocation, LocationProvider},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ip_lookup_success_yields_coordinate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "city": "London",
            "lat": 51.5074,
            "lon": -0.1278
        })))
        .mount(&server)
        .await;

    let resolver = IpLocation::new(Client::new(), format!("{}/json", server.uri()));
    assert_eq!(resolver.current_position().await, Ok(Coordinate::new(51.5074, -0.1278)));
}

#[tokio::test]
async fn ip_lookup_failure_status_is_position_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "reserved range"
        })))
        .mount(&server)
        .await;

    let resolver = IpLocation::new(Client::new(), format!("{}/json", server.uri()));
    assert_eq!(resolver.current_position().await, Err(LocationError::PositionUnavailable));
}

#[tokio::test]
async fn ip_lookup_server_error_is_position_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let resolver = IpLocation::new(Client::new(), format!("{}/json", server.uri()));
    assert_eq!(resolver.current_position().await, Err(LocationError::PositionUnavailable));
}

#[tokio::test]
async fn ip_lookup_timeout_is_reported_as_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success", "lat": 1.0, "lon": 2.0 }))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let http = Client::builder()
        .timeout(std::time::Duration::from_millis(50))
        .build()
        .unwrap();
    let resolver = IpLocation::new(http, format!("{}/json", server.uri()));
    assert_eq!(resolver.current_position().await, Err(LocationError::Timeout));
}

#[tokio::test]
async fn hazard_feed_is_parsed_into_events() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [88.5, 21.2] },
                "properties": {
                    "eventname": "REMAL-24",
                    "episodeid": 17,
                    "severitydata": { "severity": 120.5 },
                    "country": "Bangladesh"
                }
            }]
        })))
        .mount(&server)
        .await;

    let events = HazardFeed::new(Client::new(), format!("{}/events", server.uri())).fetch().await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "REMAL-24");
    assert_eq!(events[0].coordinate, Coordinate::new(21.2, 88.5));
}

#[tokio::test]
async fn hazard_feed_outage_yields_empty_layer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let events = HazardFeed::new(Client::new(), format!("{}/events", server.uri())).fetch().await;
    assert!(events.is_empty());
}
