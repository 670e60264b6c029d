//! Map view state: tile layers, weather markers, overlays and the hazard layer.
//!
//! A `MapView` owns its own [`WeatherGateway`], so its marker cache lives
//! exactly as long as the view.

use futures_util::{StreamExt, stream};
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, info};

use crate::{
    Config,
    card::ConditionIcon,
    dashboard::CANONICAL_UNITS,
    error::GatewayError,
    gateway::WeatherGateway,
    hazard::HazardFeed,
    model::{CityMarker, Coordinate, HazardEvent, WeatherRecord},
    registry,
    units::{Units, convert_speed, convert_temperature},
};

/// Meteorological overlay drawn over the base map. At most one is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Overlay {
    #[default]
    None,
    Wind,
    Pressure,
    Precipitation,
}

impl Overlay {
    /// Tile layer name on the OpenWeatherMap tile server.
    pub fn layer_name(&self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::Wind => Some("wind_new"),
            Overlay::Pressure => Some("pressure_new"),
            Overlay::Precipitation => Some("precipitation_new"),
        }
    }
}

impl FromStr for Overlay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Overlay::None),
            "wind" => Ok(Overlay::Wind),
            "pressure" => Ok(Overlay::Pressure),
            "precipitation" | "rain" => Ok(Overlay::Precipitation),
            other => Err(format!(
                "Unknown overlay '{other}'. Expected none, wind, pressure or precipitation."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    base_url: String,
    overlay_url: String,
    api_key: String,
}

impl TileSource {
    pub fn new(
        base_url: impl Into<String>,
        overlay_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { base_url: base_url.into(), overlay_url: overlay_url.into(), api_key: api_key.into() }
    }

    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Self {
        Self::new(&config.base_tile_url, &config.overlay_tile_url, api_key)
    }

    pub fn base(&self) -> &str {
        &self.base_url
    }

    pub fn overlay(&self, overlay: Overlay) -> Option<String> {
        overlay.layer_name().map(|layer| {
            self.overlay_url.replace("{layer}", layer).replace("{key}", &self.api_key)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Base(String),
    Overlay(Overlay, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub name: String,
    pub coordinate: Coordinate,
    pub weather: WeatherRecord,
    pub icon: ConditionIcon,
    pub popup_open: bool,
}

impl MapMarker {
    fn new(city: CityMarker, weather: WeatherRecord) -> Self {
        Self {
            icon: ConditionIcon::for_condition(&weather.condition_main),
            name: city.name,
            coordinate: city.coordinate,
            weather,
            popup_open: false,
        }
    }

    pub fn popup(&self, units: Units) -> String {
        let w = &self.weather;
        let symbol = units.temperature_symbol();
        format!(
            "{name}\nTemp: {temp:.1}{symbol} (Feels: {feels:.1}{symbol})\nWind: {wind:.1} {speed}\nPressure: {pressure} hPa\nCondition: {condition}",
            name = self.name,
            temp = convert_temperature(w.temperature, w.units, units),
            feels = convert_temperature(w.feels_like, w.units, units),
            wind = convert_speed(w.wind_speed, w.units, units),
            speed = units.speed_symbol(),
            pressure = w.pressure_hpa,
            condition = w.condition_description,
        )
    }
}

#[derive(Debug)]
pub struct MapView {
    gateway: WeatherGateway,
    hazard_feed: HazardFeed,
    tiles: TileSource,
    registry: Vec<CityMarker>,
    concurrency: usize,
    units: Units,
    mounted: bool,
    center: Coordinate,
    zoom: u8,
    layers: Vec<Layer>,
    markers: Vec<MapMarker>,
    hazards_visible: bool,
    hazards: Vec<HazardEvent>,
}

impl MapView {
    pub fn new(gateway: WeatherGateway, hazard_feed: HazardFeed, tiles: TileSource) -> Self {
        Self {
            gateway,
            hazard_feed,
            tiles,
            registry: registry::seed_cities(),
            concurrency: crate::config::DEFAULT_MARKER_CONCURRENCY,
            units: Units::Metric,
            mounted: false,
            center: registry::DEFAULT_CENTER,
            zoom: registry::DEFAULT_ZOOM,
            layers: Vec::new(),
            markers: Vec::new(),
            hazards_visible: false,
            hazards: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: Vec<CityMarker>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn open_marker(&self) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.popup_open)
    }

    pub fn gateway(&self) -> &WeatherGateway {
        &self.gateway
    }

    /// Initialize the surface and seed registry markers. Repeated calls on a
    /// mounted view are no-ops.
    pub async fn mount(&mut self) {
        if self.mounted {
            debug!("map already mounted");
            return;
        }
        self.mounted = true;
        self.center = registry::DEFAULT_CENTER;
        self.zoom = registry::DEFAULT_ZOOM;
        self.layers.push(Layer::Base(self.tiles.base().to_string()));

        self.populate_markers().await;
        info!(markers = self.markers.len(), cities = self.registry.len(), "map mounted");
    }

    /// Fetch registry cities with bounded concurrency, in registry order.
    /// Cities whose fetch fails get no marker.
    async fn populate_markers(&mut self) {
        let cities = self.registry.clone();
        let gateway = &self.gateway;

        let fetched: Vec<(CityMarker, Option<WeatherRecord>)> = stream::iter(cities)
            .map(|city| async move {
                let weather = gateway.fetch_current_for_marker(&city, CANONICAL_UNITS).await;
                (city, weather)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (city, weather) in fetched {
            if let Some(weather) = weather {
                self.place_marker(city, weather);
            }
        }
    }

    fn place_marker(&mut self, city: CityMarker, weather: WeatherRecord) -> usize {
        let marker = MapMarker::new(city, weather);
        match self.markers.iter().position(|m| m.name == marker.name) {
            Some(idx) => {
                self.markers[idx] = marker;
                idx
            }
            None => {
                self.markers.push(marker);
                self.markers.len() - 1
            }
        }
    }

    /// Geocode `query`, pan to it and add a marker with its popup open.
    ///
    /// Blank input or an unmounted view does nothing. `Ok(None)` means the
    /// place was found but its weather could not be fetched.
    pub async fn search(&mut self, query: &str) -> Result<Option<&MapMarker>, GatewayError> {
        if !self.mounted || query.trim().is_empty() {
            return Ok(None);
        }

        let place = self.gateway.locate_city(query).await?;
        self.center = place.coordinate;
        self.zoom = registry::SEARCH_ZOOM;

        let city = CityMarker { name: place.label(), coordinate: place.coordinate };
        let Some(weather) = self.gateway.fetch_current_for_marker(&city, CANONICAL_UNITS).await
        else {
            return Ok(None);
        };

        let idx = self.place_marker(city, weather);
        for (i, marker) in self.markers.iter_mut().enumerate() {
            marker.popup_open = i == idx;
        }
        Ok(self.markers.get(idx))
    }

    /// Attach `overlay`, detaching whichever overlay was attached before.
    pub fn select_overlay(&mut self, overlay: Overlay) {
        self.layers.retain(|layer| !matches!(layer, Layer::Overlay(..)));
        if let Some(url) = self.tiles.overlay(overlay) {
            self.layers.push(Layer::Overlay(overlay, url));
        }
        debug!(?overlay, "overlay selected");
    }

    pub fn active_overlay(&self) -> Overlay {
        self.layers
            .iter()
            .find_map(|layer| match layer {
                Layer::Overlay(overlay, _) => Some(*overlay),
                Layer::Base(_) => None,
            })
            .unwrap_or_default()
    }

    pub fn hazards_visible(&self) -> bool {
        self.hazards_visible
    }

    pub fn hazards(&self) -> &[HazardEvent] {
        &self.hazards
    }

    /// Show or hide the hazard layer; showing refetches the feed.
    pub async fn toggle_hazards(&mut self) -> bool {
        if self.hazards_visible {
            self.hazards_visible = false;
            self.hazards.clear();
        } else {
            self.hazards = self.hazard_feed.fetch().await;
            self.hazards_visible = true;
        }
        self.hazards_visible
    }

    /// Tear down every layer and marker and forget cached weather.
    pub fn unmount(&mut self) {
        self.layers.clear();
        self.markers.clear();
        self.hazards.clear();
        self.hazards_visible = false;
        self.gateway.clear_marker_cache();
        self.center = registry::DEFAULT_CENTER;
        self.zoom = registry::DEFAULT_ZOOM;
        self.mounted = false;
        debug!("map unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeProvider;
    use reqwest::Client;
    use std::{sync::Arc, time::Duration};

    fn tiles() -> TileSource {
        TileSource::new(
            crate::config::DEFAULT_BASE_TILE_URL,
            crate::config::DEFAULT_OVERLAY_TILE_URL,
            "KEY",
        )
    }

    fn view(provider: &Arc<FakeProvider>) -> MapView {
        // Port 9 (discard) refuses connections, so the feed is always unavailable.
        let feed = HazardFeed::new(Client::new(), "http://127.0.0.1:9/feed");
        MapView::new(WeatherGateway::new(provider.clone()), feed, tiles())
    }

    #[tokio::test]
    async fn mount_seeds_six_markers_once() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);

        map.mount().await;
        map.mount().await;

        assert_eq!(map.markers().len(), 6);
        assert_eq!(provider.current_calls(), 6);
        assert_eq!(map.layers().len(), 1);
        assert_eq!(map.center(), registry::DEFAULT_CENTER);
        assert_eq!(map.zoom(), registry::DEFAULT_ZOOM);
        let names: Vec<_> = map.markers().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Mumbai", "Delhi", "Bengaluru", "Chennai", "Kolkata", "Hyderabad"]);
    }

    #[tokio::test]
    async fn one_failing_city_does_not_block_the_rest() {
        let delhi = 28.6139;
        let provider = Arc::new(FakeProvider::failing_at(&[delhi]));
        let mut map = view(&provider);

        map.mount().await;

        assert_eq!(map.markers().len(), 5);
        assert!(map.markers().iter().all(|m| m.name != "Delhi"));
    }

    #[tokio::test]
    async fn population_respects_concurrency_limit() {
        let provider =
            Arc::new(FakeProvider::default().with_current_delay(Duration::from_millis(20)));
        let mut map = view(&provider).with_concurrency(2);

        map.mount().await;

        assert_eq!(map.markers().len(), 6);
        assert!(provider.max_in_flight() <= 2, "saw {}", provider.max_in_flight());
    }

    #[tokio::test]
    async fn sequential_population_with_limit_of_one() {
        let provider =
            Arc::new(FakeProvider::default().with_current_delay(Duration::from_millis(5)));
        let mut map = view(&provider).with_concurrency(1);

        map.mount().await;

        assert_eq!(provider.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn search_pans_and_opens_a_seventh_marker() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);
        map.mount().await;

        let marker = map.search("London").await.expect("search").expect("marker");
        assert_eq!(marker.name, "London, GB");
        assert!(marker.popup_open);

        assert_eq!(map.markers().len(), 7);
        assert_eq!(map.center(), Coordinate::new(51.5074, -0.1278));
        assert_eq!(map.zoom(), registry::SEARCH_ZOOM);
        assert_eq!(map.open_marker().map(|m| m.name.as_str()), Some("London, GB"));
        assert_eq!(provider.current_calls(), 7);
    }

    #[tokio::test]
    async fn repeated_search_hits_the_cache() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);
        map.mount().await;

        map.search("London").await.expect("first");
        map.search("London").await.expect("second");

        assert_eq!(map.markers().len(), 7);
        assert_eq!(provider.current_calls(), 7);
    }

    #[tokio::test]
    async fn search_reports_unknown_places_and_ignores_blank_input() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);
        map.mount().await;

        assert!(map.search("  ").await.expect("blank").is_none());
        assert_eq!(provider.geocode_calls(), 0);

        let err = map.search("Atlantis").await.unwrap_err();
        assert!(matches!(err, GatewayError::CityNotFound(_)));
        assert_eq!(map.markers().len(), 6);
    }

    #[tokio::test]
    async fn overlays_are_mutually_exclusive() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);
        map.mount().await;

        map.select_overlay(Overlay::Wind);
        map.select_overlay(Overlay::Pressure);

        assert_eq!(map.active_overlay(), Overlay::Pressure);
        let overlays: Vec<_> =
            map.layers().iter().filter(|l| matches!(l, Layer::Overlay(..))).collect();
        assert_eq!(overlays.len(), 1);
        assert!(matches!(overlays[0], Layer::Overlay(_, url) if url.contains("pressure_new") && url.contains("appid=KEY")));

        map.select_overlay(Overlay::None);
        assert_eq!(map.active_overlay(), Overlay::None);
        assert_eq!(map.layers().len(), 1);
    }

    #[tokio::test]
    async fn hazard_feed_failure_leaves_layer_empty() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);

        assert!(map.toggle_hazards().await);
        assert!(map.hazards().is_empty());
        assert!(!map.toggle_hazards().await);
    }

    #[tokio::test]
    async fn unmount_removes_everything_and_allows_remount() {
        let provider = Arc::new(FakeProvider::default());
        let mut map = view(&provider);
        map.mount().await;
        map.select_overlay(Overlay::Wind);

        map.unmount();

        assert!(!map.is_mounted());
        assert!(map.layers().is_empty());
        assert!(map.markers().is_empty());
        assert_eq!(map.gateway().cached_markers(), 0);

        map.mount().await;
        assert_eq!(map.markers().len(), 6);
        assert_eq!(provider.current_calls(), 12);
    }

    #[test]
    fn popup_projects_into_display_units() {
        let marker = MapMarker::new(
            CityMarker::new("Mumbai", 19.0760, 72.8777),
            crate::test_support::record("Mumbai", 1_717_236_000, 30.0),
        );

        let metric = marker.popup(Units::Metric);
        assert!(metric.starts_with("Mumbai\nTemp: 30.0°C (Feels: 29.0°C)"));
        assert!(metric.contains("Pressure: 1013 hPa"));
        assert!(metric.contains("Condition: scattered clouds"));

        let imperial = marker.popup(Units::Imperial);
        assert!(imperial.contains("Temp: 86.0°F"));
        assert!(imperial.contains("mph"));
    }

    #[test]
    fn overlay_parses_from_text() {
        assert_eq!("wind".parse::<Overlay>(), Ok(Overlay::Wind));
        assert_eq!("Precipitation".parse::<Overlay>(), Ok(Overlay::Precipitation));
        assert!("smoke".parse::<Overlay>().is_err());
    }
}
