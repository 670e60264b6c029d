use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::GatewayError,
    model::{Coordinate, Forecast, Place, WeatherRecord},
    provider::openweather::OpenWeatherProvider,
    units::Units,
};

pub mod openweather;

/// Raw access to a weather service. Implementations normalize payloads but do
/// no caching; see [`crate::gateway::WeatherGateway`] for that.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Multi-slice forecast for a coordinate.
    async fn forecast(&self, at: Coordinate, units: Units) -> Result<Forecast, GatewayError>;

    /// Resolve free text to places, best match first. May be empty.
    async fn geocode(&self, query: &str) -> Result<Vec<Place>, GatewayError>;

    /// Single current observation for a coordinate.
    async fn current(&self, at: Coordinate, units: Units) -> Result<WeatherRecord, GatewayError>;
}

/// Shared HTTP client honouring the configured timeout.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("weatherzy/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let http = http_client(config)?;
    Ok(Arc::new(OpenWeatherProvider::with_base_url(api_key, &config.api_base_url, http)))
}
