use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{model::Coordinate, units::Units};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHERZY_API_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_HAZARD_FEED_URL: &str =
    "https://www.gdacs.org/gdacsapi/api/events/geteventlist/SEARCH?eventlist=TC";
pub const DEFAULT_BASE_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_OVERLAY_TILE_URL: &str =
    "https://tile.openweathermap.org/map/{layer}/{z}/{x}/{y}.png?appid={key}";
pub const DEFAULT_LOCATION_LOOKUP_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_MARKER_CONCURRENCY: usize = 4;

/// Where the current position comes from.
///
/// Example TOML:
/// [location]
/// enabled = true
/// latitude = 51.5074
/// longitude = -0.1278
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// `false` behaves like a denied permission prompt.
    pub enabled: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// IP geolocation endpoint; empty string means no capability at all.
    pub lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
            lookup_url: DEFAULT_LOCATION_LOOKUP_URL.to_string(),
        }
    }
}

impl LocationConfig {
    pub fn fixed_position(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub api_base_url: String,
    pub hazard_feed_url: String,
    pub base_tile_url: String,
    pub overlay_tile_url: String,
    pub marker_concurrency: usize,
    /// Per-request timeout; `None` leaves the transport default.
    pub request_timeout_secs: Option<u64>,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::Metric,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            hazard_feed_url: DEFAULT_HAZARD_FEED_URL.to_string(),
            base_tile_url: DEFAULT_BASE_TILE_URL.to_string(),
            overlay_tile_url: DEFAULT_OVERLAY_TILE_URL.to_string(),
            marker_concurrency: DEFAULT_MARKER_CONCURRENCY,
            request_timeout_secs: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform path, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherzy", "weatherzy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        self.resolve_api_key(from_env)
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeatherMap API key configured.\n\
                     Hint: run `weatherzy configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Marker fetch concurrency, never below one.
    pub fn marker_concurrency(&self) -> usize {
        self.marker_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeatherMap API key configured"));
        assert!(msg.contains("Hint: run `weatherzy configure`"));
    }

    #[test]
    fn environment_key_wins_over_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("  STORED  ".into());

        assert_eq!(cfg.resolve_api_key(None).unwrap(), "STORED");
        assert_eq!(cfg.resolve_api_key(Some("ENV".into())).unwrap(), "ENV");
    }

    #[test]
    fn blank_stored_key_counts_as_missing() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert!(cfg.resolve_api_key(None).is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            units = "imperial"

            [location]
            latitude = 51.5074
            longitude = -0.1278
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert!(cfg.location.enabled);
        assert_eq!(cfg.location.fixed_position(), Some(Coordinate::new(51.5074, -0.1278)));
    }

    #[test]
    fn save_and_load_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.marker_concurrency = 2;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.marker_concurrency(), 2);
    }

    #[test]
    fn missing_file_yields_defaults_and_concurrency_is_clamped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(cfg.marker_concurrency(), DEFAULT_MARKER_CONCURRENCY);

        cfg.marker_concurrency = 0;
        assert_eq!(cfg.marker_concurrency(), 1);
    }
}
