//! Core library for the Weatherzy dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather gateway over OpenWeatherMap, with a per-view marker cache
//! - Geolocation resolution
//! - View state for the primary dashboard and the map, plus their projections
//!
//! It is used by `weatherzy-cli`, but any front-end can drive the same state
//! machines.

pub mod cache;
pub mod card;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod hazard;
pub mod location;
pub mod map;
pub mod model;
pub mod outlook;
pub mod pages;
pub mod provider;
pub mod registry;
pub mod units;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, LocationConfig};
pub use dashboard::{Dashboard, ViewState};
pub use error::{GatewayError, LocationError, WeatherzyError};
pub use gateway::WeatherGateway;
pub use map::{MapView, Overlay};
pub use model::{CityMarker, Coordinate, Forecast, HazardEvent, Place, WeatherRecord};
pub use provider::WeatherProvider;
pub use units::Units;
