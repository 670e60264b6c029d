use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    cache::{CachePolicy, MarkerCache},
    error::{Endpoint, GatewayError},
    model::{CityMarker, Coordinate, Forecast, Place, WeatherRecord},
    provider::WeatherProvider,
    units::Units,
};

/// Front door to the weather provider: input validation, the geocode-then-fetch
/// chain, and the per-instance marker cache.
#[derive(Debug)]
pub struct WeatherGateway {
    provider: Arc<dyn WeatherProvider>,
    marker_cache: Mutex<MarkerCache>,
}

impl WeatherGateway {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_cache_policy(provider, CachePolicy::unbounded())
    }

    pub fn with_cache_policy(provider: Arc<dyn WeatherProvider>, policy: CachePolicy) -> Self {
        Self { provider, marker_cache: Mutex::new(MarkerCache::new(policy)) }
    }

    pub async fn fetch_by_coordinates(
        &self,
        at: Coordinate,
        units: Units,
    ) -> Result<Forecast, GatewayError> {
        debug!(%at, %units, "fetching forecast");
        let forecast = self.provider.forecast(at, units).await?;

        if forecast.records.is_empty() {
            return Err(GatewayError::invalid_payload(Endpoint::Forecast, "empty forecast"));
        }

        info!(
            city = %forecast.city,
            country = %forecast.country,
            slices = forecast.records.len(),
            "forecast received"
        );
        Ok(forecast)
    }

    /// Geocode a free-text query to its best match.
    pub async fn locate_city(&self, name: &str) -> Result<Place, GatewayError> {
        let query = name.trim();
        if query.is_empty() {
            return Err(GatewayError::EmptyInput);
        }

        self.provider
            .geocode(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::CityNotFound(query.to_string()))
    }

    pub async fn fetch_by_city_name(
        &self,
        name: &str,
        units: Units,
    ) -> Result<Forecast, GatewayError> {
        let place = self.locate_city(name).await?;
        debug!(place = %place.label(), at = %place.coordinate, "geocoded");
        self.fetch_by_coordinates(place.coordinate, units).await
    }

    /// Current weather for a marker, at most one request per name.
    ///
    /// Failures are logged and reported as `None` so the caller can carry on
    /// with the remaining markers.
    pub async fn fetch_current_for_marker(
        &self,
        marker: &CityMarker,
        units: Units,
    ) -> Option<WeatherRecord> {
        let cached = self.marker_cache.lock().get(&marker.name);
        if let Some(hit) = cached {
            debug!(city = %marker.name, "marker cache hit");
            return Some(hit);
        }

        match self.provider.current(marker.coordinate, units).await {
            Ok(mut record) => {
                record.city = marker.name.clone();
                self.marker_cache.lock().insert(marker.name.clone(), record.clone());
                Some(record)
            }
            Err(e) => {
                warn!(city = %marker.name, error = %e, "marker weather fetch failed");
                None
            }
        }
    }

    pub fn cached_markers(&self) -> usize {
        self.marker_cache.lock().len()
    }

    pub fn clear_marker_cache(&self) {
        self.marker_cache.lock().clear();
    }
}
