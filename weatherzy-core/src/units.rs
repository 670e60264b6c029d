use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MPS_PER_MPH: f64 = 0.44704;

/// Unit system for display and for the provider's `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    /// Label for a button that switches to the other system.
    pub fn switch_label(&self) -> &'static str {
        match self {
            Units::Metric => "Switch to Fahrenheit",
            Units::Imperial => "Switch to Celsius",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Units::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Units::Imperial),
            other => Err(format!("Unknown units '{other}'. Expected 'metric' or 'imperial'.")),
        }
    }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Re-express a temperature measured in `from` in the `to` system.
pub fn convert_temperature(value: f64, from: Units, to: Units) -> f64 {
    match (from, to) {
        (Units::Metric, Units::Imperial) => celsius_to_fahrenheit(value),
        (Units::Imperial, Units::Metric) => fahrenheit_to_celsius(value),
        _ => value,
    }
}

/// Re-express a wind speed (m/s in metric, mph in imperial).
pub fn convert_speed(value: f64, from: Units, to: Units) -> f64 {
    match (from, to) {
        (Units::Metric, Units::Imperial) => value / MPS_PER_MPH,
        (Units::Imperial, Units::Metric) => value * MPS_PER_MPH,
        _ => value,
    }
}
