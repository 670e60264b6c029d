//! Error taxonomy for the dashboard.
//!
//! Every error carries two faces: a `Display` impl with diagnostic detail for
//! logs, and `user_message()` with the fixed text shown in the error banner.

use thiserror::Error;

/// Remote endpoint an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Forecast,
    Geocoding,
    Current,
    HazardFeed,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Endpoint::Forecast => "forecast",
            Endpoint::Geocoding => "geocoding",
            Endpoint::Current => "current weather",
            Endpoint::HazardFeed => "hazard feed",
        })
    }
}

/// Failures of the location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("no location capability available")]
    Unsupported,
}

impl LocationError {
    /// Map a platform geolocation error code (1, 2, 3) to a variant.
    ///
    /// Unknown codes are treated as timeouts, the last branch of the platform contract.
    pub fn from_platform_code(code: u16) -> Self {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            _ => LocationError::Timeout,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Permission denied. Please allow location access.",
            LocationError::PositionUnavailable => "Position unavailable. Please try again.",
            LocationError::Timeout => "Timeout. Unable to retrieve location.",
            LocationError::Unsupported => "Geolocation is not supported on this system.",
        }
    }
}

/// Failures of the weather gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{endpoint} request failed: {message}")]
    Network { endpoint: Endpoint, message: String },

    #[error("invalid {endpoint} payload: {message}")]
    InvalidPayload { endpoint: Endpoint, message: String },

    #[error("no geocoding results for '{0}'")]
    CityNotFound(String),

    #[error("empty search query")]
    EmptyInput,
}

impl GatewayError {
    pub fn network(endpoint: Endpoint, message: impl Into<String>) -> Self {
        GatewayError::Network { endpoint, message: message.into() }
    }

    pub fn invalid_payload(endpoint: Endpoint, message: impl Into<String>) -> Self {
        GatewayError::InvalidPayload { endpoint, message: message.into() }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::Network { endpoint: Endpoint::Geocoding, .. } => {
                "Error fetching data. Please try again."
            }
            GatewayError::Network { .. } => "Unable to retrieve weather data.",
            GatewayError::InvalidPayload { .. } => "Invalid weather data received from the API.",
            GatewayError::CityNotFound(_) => "City not found. Please try another search.",
            GatewayError::EmptyInput => "Please enter a city name",
        }
    }

    /// Convert a transport error, keeping the status code when there is one.
    pub fn from_reqwest(endpoint: Endpoint, err: reqwest::Error) -> Self {
        let message = match err.status() {
            Some(status) => format!("status {status}: {err}"),
            None if err.is_timeout() => format!("timed out: {err}"),
            None => err.to_string(),
        };
        GatewayError::network(endpoint, message)
    }
}

/// Top-level error for view-layer operations.
#[derive(Debug, Error)]
pub enum WeatherzyError {
    #[error("location error: {0}")]
    Location(#[from] LocationError),

    #[error("weather gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl WeatherzyError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherzyError::Location(e) => e.user_message(),
            WeatherzyError::Gateway(e) => e.user_message(),
        }
    }

    pub fn is_city_not_found(&self) -> bool {
        matches!(self, WeatherzyError::Gateway(GatewayError::CityNotFound(_)))
    }
}
