use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Endpoint, GatewayError},
    model::{Coordinate, Forecast, Place, WeatherRecord},
    units::Units,
};

use super::WeatherProvider;

const FORECAST_PATH: &str = "/data/2.5/forecast";
const CURRENT_PATH: &str = "/data/2.5/weather";
const GEOCODE_PATH: &str = "/geo/1.0/direct";

/// The provider omits `visibility` when it is at or above its 10 km ceiling.
const MAX_REPORTED_VISIBILITY_M: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: String, base_url: &str, http: Client) -> Self {
        Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    async fn get_body(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%endpoint, %url, "sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(endpoint, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| GatewayError::from_reqwest(endpoint, e))?;

        if !status.is_success() {
            return Err(GatewayError::network(
                endpoint,
                format!("status {}: {}", status, truncate_body(&body)),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    visibility: Option<u32>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    population: Option<u64>,
    #[serde(default)]
    timezone: i32,
    coord: Option<OwCoord>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Option<Vec<OwForecastEntry>>,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

/// Location fields shared by every slice of one response.
struct Site<'a> {
    city: &'a str,
    country: &'a str,
    population: Option<u64>,
}

#[allow(clippy::too_many_arguments)]
fn to_record(
    endpoint: Endpoint,
    site: &Site<'_>,
    dt: i64,
    main: &OwMain,
    weather: &[OwWeather],
    wind: &OwWind,
    clouds: &OwClouds,
    visibility: Option<u32>,
    units: Units,
) -> Result<WeatherRecord, GatewayError> {
    let condition = weather.first().ok_or_else(|| {
        GatewayError::invalid_payload(endpoint, format!("entry at {dt} has no weather condition"))
    })?;
    let observed_at = DateTime::<Utc>::from_timestamp(dt, 0).ok_or_else(|| {
        GatewayError::invalid_payload(endpoint, format!("timestamp {dt} is out of range"))
    })?;

    Ok(WeatherRecord {
        city: site.city.to_string(),
        country: site.country.to_string(),
        population: site.population,
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity_pct: main.humidity,
        wind_speed: wind.speed,
        wind_direction_deg: normalize_degrees(wind.deg),
        cloudiness_pct: clouds.all,
        visibility_meters: visibility.unwrap_or(MAX_REPORTED_VISIBILITY_M),
        pressure_hpa: main.pressure,
        condition_main: condition.main.clone(),
        condition_description: condition.description.clone(),
        observed_at,
        units,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn forecast(&self, at: Coordinate, units: Units) -> Result<Forecast, GatewayError> {
        let endpoint = Endpoint::Forecast;
        let body = self
            .get_body(
                endpoint,
                FORECAST_PATH,
                &[
                    ("lat", at.latitude.to_string()),
                    ("lon", at.longitude.to_string()),
                    ("units", units.as_str().to_string()),
                ],
            )
            .await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::invalid_payload(endpoint, e.to_string()))?;

        let city = parsed
            .city
            .ok_or_else(|| GatewayError::invalid_payload(endpoint, "response has no city"))?;
        let list = parsed
            .list
            .filter(|l| !l.is_empty())
            .ok_or_else(|| GatewayError::invalid_payload(endpoint, "response has no forecast entries"))?;

        let site = Site { city: &city.name, country: &city.country, population: city.population };
        let records = list
            .iter()
            .map(|e| {
                to_record(
                    endpoint,
                    &site,
                    e.dt,
                    &e.main,
                    &e.weather,
                    &e.wind,
                    &e.clouds,
                    e.visibility,
                    units,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let coordinate = city.coord.map(|c| Coordinate::new(c.lat, c.lon)).unwrap_or(at);

        Ok(Forecast {
            city: city.name,
            country: city.country,
            population: city.population,
            coordinate,
            utc_offset_secs: city.timezone,
            units,
            records,
        })
    }

    async fn geocode(&self, query: &str) -> Result<Vec<Place>, GatewayError> {
        let endpoint = Endpoint::Geocoding;
        let body = self
            .get_body(
                endpoint,
                GEOCODE_PATH,
                &[("q", query.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let parsed: Vec<OwPlace> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::invalid_payload(endpoint, e.to_string()))?;

        Ok(parsed
            .into_iter()
            .map(|p| Place {
                name: p.name,
                country: p.country,
                state: p.state,
                coordinate: Coordinate::new(p.lat, p.lon),
            })
            .collect())
    }

    async fn current(&self, at: Coordinate, units: Units) -> Result<WeatherRecord, GatewayError> {
        let endpoint = Endpoint::Current;
        let body = self
            .get_body(
                endpoint,
                CURRENT_PATH,
                &[
                    ("lat", at.latitude.to_string()),
                    ("lon", at.longitude.to_string()),
                    ("units", units.as_str().to_string()),
                ],
            )
            .await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::invalid_payload(endpoint, e.to_string()))?;

        let country = parsed.sys.and_then(|s| s.country).unwrap_or_default();
        let site = Site { city: &parsed.name, country: &country, population: None };

        to_record(
            endpoint,
            &site,
            parsed.dt,
            &parsed.main,
            &parsed.weather,
            &parsed.wind,
            &parsed.clouds,
            parsed.visibility,
            units,
        )
    }
}

fn normalize_degrees(deg: f64) -> u16 {
    (deg.rem_euclid(360.0).round() as u16) % 360
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
