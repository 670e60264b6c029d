//! In-process fakes shared by unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use crate::{
    error::{Endpoint, GatewayError},
    model::{Coordinate, Forecast, Place, WeatherRecord},
    provider::WeatherProvider,
    units::Units,
};

pub fn record(city: &str, ts: i64, temp: f64) -> WeatherRecord {
    WeatherRecord {
        city: city.to_string(),
        country: "GB".to_string(),
        population: Some(1_000_000),
        temperature: temp,
        feels_like: temp - 1.0,
        humidity_pct: 72,
        wind_speed: 4.0,
        wind_direction_deg: 240,
        cloudiness_pct: 40,
        visibility_meters: 10_000,
        pressure_hpa: 1013,
        condition_main: "Clouds".to_string(),
        condition_description: "scattered clouds".to_string(),
        observed_at: Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now),
        units: Units::Metric,
    }
}

pub fn sample_forecast() -> Forecast {
    let base = 1_717_236_000; // 2024-06-01T10:00:00Z
    Forecast {
        city: "London".to_string(),
        country: "GB".to_string(),
        population: Some(1_000_000),
        coordinate: Coordinate::new(51.5074, -0.1278),
        utc_offset_secs: 3600,
        units: Units::Metric,
        records: (0..8).map(|i| record("London", base + i * 3 * 3600, 14.0 + i as f64)).collect(),
    }
}

#[derive(Debug, Default)]
pub struct FakeProvider {
    forecast_calls: AtomicUsize,
    geocode_calls: AtomicUsize,
    current_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_forecast_units: Mutex<Option<Units>>,
    /// Latitudes whose current-weather request fails.
    failing_latitudes: Mutex<Vec<f64>>,
    current_delay: Mutex<Option<Duration>>,
}

impl FakeProvider {
    pub fn failing_at(latitudes: &[f64]) -> Self {
        let fake = Self::default();
        *fake.failing_latitudes.lock() = latitudes.to_vec();
        fake
    }

    pub fn with_current_delay(self, delay: Duration) -> Self {
        *self.current_delay.lock() = Some(delay);
        self
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_forecast_units(&self) -> Option<Units> {
        *self.last_forecast_units.lock()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn forecast(&self, at: Coordinate, units: Units) -> Result<Forecast, GatewayError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_forecast_units.lock() = Some(units);
        let mut forecast = sample_forecast();
        forecast.coordinate = at;
        Ok(forecast)
    }

    async fn geocode(&self, query: &str) -> Result<Vec<Place>, GatewayError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match query {
            "London" => Ok(vec![Place {
                name: "London".into(),
                country: "GB".into(),
                state: Some("England".into()),
                coordinate: Coordinate::new(51.5074, -0.1278),
            }]),
            "Offline" => Err(GatewayError::network(Endpoint::Geocoding, "connection refused")),
            _ => Ok(Vec::new()),
        }
    }

    async fn current(&self, at: Coordinate, units: Units) -> Result<WeatherRecord, GatewayError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.current_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_latitudes.lock().iter().any(|lat| (*lat - at.latitude).abs() < 1e-9) {
            return Err(GatewayError::network(Endpoint::Current, "status 500"));
        }

        let mut record = record("Somewhere", 1_717_236_000, 31.0);
        record.units = units;
        Ok(record)
    }
}
