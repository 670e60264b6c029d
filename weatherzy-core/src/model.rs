use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::Units;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One forecast time-slice (or a single current observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub population: Option<u64>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_direction_deg: u16,
    pub cloudiness_pct: u8,
    pub visibility_meters: u32,
    pub pressure_hpa: u32,
    pub condition_main: String,
    pub condition_description: String,
    pub observed_at: DateTime<Utc>,
    /// Unit system the figures above were fetched in.
    pub units: Units,
}

impl WeatherRecord {
    pub fn observed_at_epoch_ms(&self) -> i64 {
        self.observed_at.timestamp_millis()
    }
}

/// A normalized forecast response: non-empty, chronologically ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub population: Option<u64>,
    pub coordinate: Coordinate,
    /// Offset of the city's local time from UTC, as reported by the provider.
    pub utc_offset_secs: i32,
    pub units: Units,
    pub records: Vec<WeatherRecord>,
}

impl Forecast {
    /// The slice closest to now; a normalized forecast always has one.
    pub fn first(&self) -> Option<&WeatherRecord> {
        self.records.first()
    }
}

/// A geocoding hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub coordinate: Coordinate,
}

impl Place {
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// Named coordinate used to seed a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMarker {
    pub name: String,
    pub coordinate: Coordinate,
}

impl CityMarker {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), coordinate: Coordinate::new(latitude, longitude) }
    }
}

/// A live hazard (e.g. tropical cyclone) from the public feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardEvent {
    pub name: String,
    pub coordinate: Coordinate,
    pub severity: f64,
    pub episode_id: u64,
    pub country: String,
}
