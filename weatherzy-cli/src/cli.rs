use anyhow::Context;
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Select};
use tracing::debug;
use weatherzy_core::{
    Config, Dashboard, MapView, Overlay, Units, WeatherGateway,
    hazard::HazardFeed,
    location::resolver_from_config,
    map::TileSource,
    pages::ContactMessage,
    provider::{http_client, provider_from_config},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherzy", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and display preferences.
    Configure,

    /// Show current weather for your location or a city.
    Now {
        /// City to search for; omit to use your current location.
        #[arg(long)]
        city: Option<String>,

        /// Display units: metric or imperial.
        #[arg(long)]
        units: Option<Units>,
    },

    /// Show the hourly and five-day forecast.
    Forecast {
        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        units: Option<Units>,
    },

    /// Show the weather map: city markers, overlays and hazards.
    Map {
        /// Location to search for and pin on the map.
        #[arg(long)]
        search: Option<String>,

        /// Overlay layer: none, wind, pressure or precipitation.
        #[arg(long, default_value = "none")]
        overlay: Overlay,

        /// Show live hazard markers.
        #[arg(long)]
        hazards: bool,

        #[arg(long)]
        units: Option<Units>,
    },

    /// Send us a message.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },

    /// About this app.
    About,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Now { city, units } => {
                let config = Config::load()?;
                let dash = load_dashboard(&config, city.as_deref(), units).await?;
                print!("{}", render::DashboardView { dash: &dash, local_hour: Local::now().hour() });
                Ok(())
            }
            Command::Forecast { city, units } => {
                let config = Config::load()?;
                let dash = load_dashboard(&config, city.as_deref(), units).await?;
                print!("{}", render::ForecastView(&dash));
                Ok(())
            }
            Command::Map { search, overlay, hazards, units } => {
                let config = Config::load()?;
                show_map(&config, search.as_deref(), overlay, hazards, units).await
            }
            Command::Contact { name, email, message } => {
                let msg = ContactMessage::new(&name, &email, &message)
                    .context("Contact form is incomplete")?;
                println!("{}", msg.send());
                Ok(())
            }
            Command::About => {
                print!("{}", render::About);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(api_key);

    let start = match config.units {
        Units::Metric => 0,
        Units::Imperial => 1,
    };
    config.units = Select::new("Default units:", vec![Units::Metric, Units::Imperial])
        .with_starting_cursor(start)
        .prompt()?;

    config.location.enabled = Confirm::new("Allow location lookup when no city is given?")
        .with_default(config.location.enabled)
        .prompt()?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn load_dashboard(
    config: &Config,
    city: Option<&str>,
    units: Option<Units>,
) -> anyhow::Result<Dashboard> {
    let gateway = WeatherGateway::new(provider_from_config(config)?);
    let mut dash = Dashboard::new(config.units);
    if let Some(units) = units {
        dash.set_units(units);
    }

    match city {
        Some(city) => dash.search(&gateway, city).await,
        None => {
            let location = resolver_from_config(&config.location, http_client(config)?);
            debug!(?location, "resolving current location");
            dash.load_current_location(location.as_ref(), &gateway).await;
        }
    }

    Ok(dash)
}

async fn show_map(
    config: &Config,
    search: Option<&str>,
    overlay: Overlay,
    hazards: bool,
    units: Option<Units>,
) -> anyhow::Result<()> {
    let api_key = config.api_key()?;
    let gateway = WeatherGateway::new(provider_from_config(config)?);
    let feed = HazardFeed::new(http_client(config)?, &config.hazard_feed_url);

    let mut map = MapView::new(gateway, feed, TileSource::from_config(config, api_key))
        .with_concurrency(config.marker_concurrency());
    map.set_units(units.unwrap_or(config.units));

    map.mount().await;

    let mut notice = None;
    if let Some(query) = search.filter(|q| !q.trim().is_empty()) {
        notice = match map.search(query).await {
            Ok(Some(_)) => None,
            Ok(None) => Some(format!("No weather available for '{}'", query.trim())),
            Err(e) => Some(render::map_search_error(&e).to_string()),
        };
    }

    map.select_overlay(overlay);
    if hazards {
        map.toggle_hazards().await;
    }

    if let Some(notice) = notice {
        eprintln!("{notice}");
    }
    print!("{}", render::MapSummary(&map));

    map.unmount();
    Ok(())
}
