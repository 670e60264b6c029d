//! Weather card: a display projection of one [`WeatherRecord`].

use serde::Serialize;

use crate::{
    model::WeatherRecord,
    units::{Units, convert_speed, convert_temperature},
};

/// Icon family for a condition's `main` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConditionIcon {
    Sun,
    Cloud,
    Rain,
    Snow,
    Sleet,
    Hail,
    Fog,
    SleetStorm,
    Thunderstorm,
}

impl ConditionIcon {
    /// Unknown conditions fall back to the sun.
    pub fn for_condition(main: &str) -> Self {
        match main.trim().to_lowercase().as_str() {
            "clouds" => Self::Cloud,
            "rain" | "showers" | "drizzle" => Self::Rain,
            "snow" => Self::Snow,
            "sleet" => Self::Sleet,
            "hail" => Self::Hail,
            "fog" | "mist" | "haze" => Self::Fog,
            "wintry mix" => Self::SleetStorm,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Sun,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Sun => "☀",
            Self::Cloud => "☁",
            Self::Rain => "🌧",
            Self::Snow => "❄",
            Self::Sleet => "🌨",
            Self::Hail => "🧊",
            Self::Fog => "🌫",
            Self::SleetStorm => "🌨",
            Self::Thunderstorm => "⛈",
        }
    }
}

/// Card background, chosen from the condition and the viewer's hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Backdrop {
    Rainy,
    Morning,
    Evening,
    Night,
}

impl Backdrop {
    pub fn pick(condition_main: &str, hour: u32) -> Self {
        let condition = condition_main.to_lowercase();
        if condition.contains("rain") || condition.contains("shower") {
            Self::Rainy
        } else if (6..17).contains(&hour) {
            Self::Morning
        } else if (17..20).contains(&hour) {
            Self::Evening
        } else {
            Self::Night
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherCard {
    pub title: String,
    pub units: Units,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub icon: ConditionIcon,
    pub backdrop: Backdrop,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_direction_deg: u16,
    pub cloudiness_pct: u8,
    pub visibility_km: f64,
    pub pressure_hpa: u32,
}

impl WeatherCard {
    /// Project `record` into `units`; no network involved.
    pub fn project(record: &WeatherRecord, units: Units, local_hour: u32) -> Self {
        let city = if record.city.is_empty() { "Unknown City" } else { record.city.as_str() };
        let country =
            if record.country.is_empty() { "Unknown Country" } else { record.country.as_str() };

        Self {
            title: format!("Weather in {city}, {country}"),
            units,
            temperature: convert_temperature(record.temperature, record.units, units),
            feels_like: convert_temperature(record.feels_like, record.units, units),
            condition: format!("{} - {}", record.condition_main, record.condition_description),
            icon: ConditionIcon::for_condition(&record.condition_main),
            backdrop: Backdrop::pick(&record.condition_main, local_hour),
            humidity_pct: record.humidity_pct,
            wind_speed: convert_speed(record.wind_speed, record.units, units),
            wind_direction_deg: record.wind_direction_deg,
            cloudiness_pct: record.cloudiness_pct,
            visibility_km: f64::from(record.visibility_meters) / 1000.0,
            pressure_hpa: record.pressure_hpa,
        }
    }

    pub fn temperature_text(&self) -> String {
        format!("{:.1} {}", self.temperature, self.units.temperature_symbol())
    }

    pub fn feels_like_text(&self) -> String {
        format!("Feels Like: {:.1} {}", self.feels_like, self.units.temperature_symbol())
    }

    pub fn wind_text(&self) -> String {
        format!(
            "Wind Speed: {:.1} {}, {}°",
            self.wind_speed,
            self.units.speed_symbol(),
            self.wind_direction_deg
        )
    }

    /// Detail rows in display order.
    pub fn details(&self) -> Vec<String> {
        vec![
            format!("Humidity: {}%", self.humidity_pct),
            self.wind_text(),
            format!("Cloudiness: {}%", self.cloudiness_pct),
            format!("Visibility: {} km", self.visibility_km),
            format!("Pressure: {} hPa", self.pressure_hpa),
        ]
    }
}
