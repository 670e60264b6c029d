//! Geolocation resolver.
//!
//! A one-shot position query with the browser geolocation failure modes:
//! permission denied, position unavailable, timeout, or no capability at all.
//! No retries; callers decide whether to ask again.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, info};

use crate::{config::LocationConfig, error::LocationError, model::Coordinate};

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// A position pinned in configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Location access switched off by the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// No location capability on this system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Approximate position from an IP geolocation service.
#[derive(Debug, Clone)]
pub struct IpLocation {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        debug!(url = %self.url, "looking up position by IP");

        let res = self.http.get(&self.url).send().await.map_err(|e| {
            debug!(error = %e, "IP lookup failed");
            if e.is_timeout() { LocationError::Timeout } else { LocationError::PositionUnavailable }
        })?;

        if !res.status().is_success() {
            debug!(status = %res.status(), "IP lookup returned non-success status");
            return Err(LocationError::PositionUnavailable);
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            debug!(error = %e, "IP lookup body unreadable");
            if e.is_timeout() { LocationError::Timeout } else { LocationError::PositionUnavailable }
        })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                let at = Coordinate::new(lat, lon);
                info!(%at, "resolved position by IP");
                Ok(at)
            }
            _ => Err(LocationError::PositionUnavailable),
        }
    }
}

/// Pick the location capability described by configuration.
pub fn resolver_from_config(config: &LocationConfig, http: Client) -> Arc<dyn LocationProvider> {
    if !config.enabled {
        return Arc::new(DeniedLocation);
    }
    if let Some(at) = config.fixed_position() {
        return Arc::new(FixedLocation(at));
    }
    if config.lookup_url.trim().is_empty() {
        return Arc::new(NoLocation);
    }
    Arc::new(IpLocation::new(http, config.lookup_url.trim()))
}
