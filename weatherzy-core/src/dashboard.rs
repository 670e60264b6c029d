//! Primary view state: `Idle -> Loading -> {Success, Error}`.
//!
//! Every fetch is tagged with a [`RequestTicket`]; an outcome is applied only if
//! its ticket is the most recently issued one, so a slow response to an older
//! request can never overwrite a newer one. Forecasts are always fetched in
//! [`CANONICAL_UNITS`]; the display preference is a pure projection.

use tracing::{debug, info, warn};

use crate::{
    card::WeatherCard,
    error::WeatherzyError,
    gateway::WeatherGateway,
    location::LocationProvider,
    model::Forecast,
    outlook::{self, DailySummary, HourlyPoint},
    units::Units,
};

pub const CANONICAL_UNITS: Units = Units::Metric;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Success,
    /// Banner text shown in place of the content area.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// What triggered a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    CurrentLocation,
    Search,
    Refresh,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    state: ViewState,
    forecast: Option<Forecast>,
    from_current_location: bool,
    units: Units,
    issued: u64,
}

impl Dashboard {
    pub fn new(units: Units) -> Self {
        Self { units, ..Self::default() }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    pub fn banner(&self) -> Option<&str> {
        match &self.state {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Last successfully fetched forecast, kept across later failures.
    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    /// Flip the display units. Figures are re-projected; nothing is fetched.
    pub fn toggle_units(&mut self) -> Units {
        self.units = self.units.toggled();
        debug!(units = %self.units, "display units toggled");
        self.units
    }

    /// Start a fetch: enter `Loading` and supersede any request in flight.
    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        self.state = ViewState::Loading;
        RequestTicket(self.issued)
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply a fetch outcome. Returns `false` if the ticket was stale and the
    /// outcome was discarded.
    pub fn finish(
        &mut self,
        ticket: RequestTicket,
        origin: Origin,
        outcome: Result<Forecast, WeatherzyError>,
    ) -> bool {
        if !self.is_latest(ticket) {
            debug!(ticket = ticket.0, latest = self.issued, "discarding stale response");
            return false;
        }

        match outcome {
            Ok(forecast) => {
                info!(city = %forecast.city, ?origin, "dashboard updated");
                match origin {
                    Origin::CurrentLocation => self.from_current_location = true,
                    Origin::Search => self.from_current_location = false,
                    Origin::Refresh => {}
                }
                self.forecast = Some(forecast);
                self.state = ViewState::Success;
            }
            Err(e) => {
                warn!(error = %e, ?origin, "dashboard fetch failed");
                self.state = ViewState::Error(e.user_message().to_string());
            }
        }
        true
    }

    /// Mount flow: resolve the current position, then fetch its forecast.
    /// A location failure ends in the error banner without any fetch.
    pub async fn load_current_location(
        &mut self,
        location: &dyn LocationProvider,
        gateway: &WeatherGateway,
    ) {
        let ticket = self.begin();
        let outcome = match location.current_position().await {
            Ok(at) => gateway.fetch_by_coordinates(at, CANONICAL_UNITS).await.map_err(Into::into),
            Err(e) => Err(e.into()),
        };
        self.finish(ticket, Origin::CurrentLocation, outcome);
    }

    pub async fn search(&mut self, gateway: &WeatherGateway, query: &str) {
        let ticket = self.begin();
        let outcome = gateway.fetch_by_city_name(query, CANONICAL_UNITS).await.map_err(Into::into);
        self.finish(ticket, Origin::Search, outcome);
    }

    /// Re-query the last shown location. Returns `false` if there is none.
    pub async fn refresh(&mut self, gateway: &WeatherGateway) -> bool {
        let Some(at) = self.forecast.as_ref().map(|f| f.coordinate) else {
            return false;
        };
        let ticket = self.begin();
        let outcome = gateway.fetch_by_coordinates(at, CANONICAL_UNITS).await.map_err(Into::into);
        self.finish(ticket, Origin::Refresh, outcome);
        true
    }

    pub fn headline(&self) -> Option<String> {
        match (&self.state, &self.forecast) {
            (ViewState::Success, Some(f)) if self.from_current_location => Some(format!(
                "Weather at your current location: {}, {}",
                f.city, f.country
            )),
            _ => None,
        }
    }

    /// Card for the first slice; hidden while loading or showing an error.
    pub fn card(&self, local_hour: u32) -> Option<WeatherCard> {
        if self.state != ViewState::Success {
            return None;
        }
        let forecast = self.forecast.as_ref()?;
        forecast.first().map(|record| WeatherCard::project(record, self.units, local_hour))
    }

    pub fn hourly(&self) -> Vec<HourlyPoint> {
        self.forecast.as_ref().map(|f| outlook::hourly(f, self.units)).unwrap_or_default()
    }

    pub fn daily(&self) -> Vec<DailySummary> {
        self.forecast.as_ref().map(|f| outlook::daily(f, self.units)).unwrap_or_default()
    }
}
