//! Plain-text views of dashboard and map state.

use std::fmt;

use chrono::{FixedOffset, Offset, Utc};
use weatherzy_core::{
    Dashboard, GatewayError, MapView, ViewState,
    card::WeatherCard,
    hazard::HALO_RADIUS_METERS,
    map::Layer,
    pages::{ABOUT_FEATURES, ABOUT_INTRO, ABOUT_TITLE},
};

/// Primary view: banner, or headline plus weather card.
pub struct DashboardView<'a> {
    pub dash: &'a Dashboard,
    pub local_hour: u32,
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dash.state() {
            ViewState::Idle => Ok(()),
            ViewState::Loading => writeln!(f, "Loading..."),
            ViewState::Error(msg) => writeln!(f, "! {msg}"),
            ViewState::Success => {
                if let Some(headline) = self.dash.headline() {
                    writeln!(f, "{headline}\n")?;
                }
                match self.dash.card(self.local_hour) {
                    Some(card) => write_card(f, &card),
                    None => Ok(()),
                }
            }
        }
    }
}

fn write_card(f: &mut fmt::Formatter<'_>, card: &WeatherCard) -> fmt::Result {
    writeln!(f, "{}", card.title)?;
    writeln!(f, "{} {}", card.icon.glyph(), card.condition)?;
    writeln!(f, "{}  ({})", card.temperature_text(), card.feels_like_text())?;
    for row in card.details() {
        writeln!(f, "  {row}")?;
    }
    writeln!(f, "[{}]", card.units.switch_label())
}

/// Hourly list and five-day summary of the last good forecast.
pub struct ForecastView<'a>(pub &'a Dashboard);

impl fmt::Display for ForecastView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dash = self.0;
        if let Some(banner) = dash.banner() {
            writeln!(f, "! {banner}")?;
        }

        let Some(forecast) = dash.forecast() else {
            return Ok(());
        };

        let offset = FixedOffset::east_opt(forecast.utc_offset_secs).unwrap_or_else(|| Utc.fix());
        let symbol = dash.units().temperature_symbol();

        writeln!(f, "Hourly forecast for {}, {}", forecast.city, forecast.country)?;
        for point in dash.hourly() {
            writeln!(
                f,
                "  {}  {:>6.1}{symbol}  {}",
                point.time.with_timezone(&offset).format("%a %H:%M"),
                point.temperature,
                point.condition
            )?;
        }

        writeln!(f, "\nFive-day forecast")?;
        for day in dash.daily() {
            writeln!(
                f,
                "  {}  {:.0}{symbol} / {:.0}{symbol}  {} {}",
                day.date.format("%a %d %b"),
                day.min,
                day.max,
                day.icon.glyph(),
                day.condition
            )?;
        }
        Ok(())
    }
}

pub struct MapSummary<'a>(pub &'a MapView);

impl fmt::Display for MapSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.0;
        writeln!(f, "Weather Monitoring")?;
        writeln!(f, "Center: {} (zoom {})", map.center(), map.zoom())?;

        for layer in map.layers() {
            match layer {
                Layer::Base(url) => writeln!(f, "Base tiles: {url}")?,
                Layer::Overlay(overlay, url) => writeln!(f, "Overlay ({overlay:?}): {url}")?,
            }
        }

        writeln!(f, "\nMarkers ({}):", map.markers().len())?;
        for marker in map.markers() {
            let open = if marker.popup_open { "*" } else { " " };
            let popup = marker.popup(map.units());
            let mut lines = popup.lines();
            if let Some(first) = lines.next() {
                writeln!(f, "{open} {} {first}", marker.icon.glyph())?;
            }
            for line in lines {
                writeln!(f, "    {line}")?;
            }
        }

        if map.hazards_visible() {
            writeln!(
                f,
                "\nHazards ({}, {} km halo):",
                map.hazards().len(),
                HALO_RADIUS_METERS / 1000
            )?;
            for event in map.hazards() {
                writeln!(
                    f,
                    "  {} ({}) severity {:.1}, episode {} at {}",
                    event.name, event.country, event.severity, event.episode_id, event.coordinate
                )?;
            }
        }
        Ok(())
    }
}

/// Map search errors use their own wording, separate from the dashboard banner.
pub fn map_search_error(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::CityNotFound(_) => "Location not found",
        _ => "Error searching for location",
    }
}

pub struct About;

impl fmt::Display for About {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ABOUT_TITLE}\n\n{ABOUT_INTRO}\n")?;
        for (heading, description) in ABOUT_FEATURES {
            writeln!(f, "{heading}\n  {description}")?;
        }
        Ok(())
    }
}
