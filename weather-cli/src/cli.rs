use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::mpsc;

use weather_core::{
    Config, Country, CountryRankingJob, GeoClient, LocationStore, OpenMeteoProvider,
    RankingOutcome, Selection, TemperatureUnit, WeatherOrchestrator,
    http::build_client,
    resolve,
    resolver::{find_city, find_country},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather, local time and flag for any place")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the database path and preferred unit.
    Configure,

    /// List countries, or the cities of one country.
    Countries {
        /// Country name or two-letter code.
        country: Option<String>,
    },

    /// Show weather, local time and flag for a city or raw coordinates.
    Show {
        /// Country name or two-letter code (with --city).
        #[arg(long, requires = "city", conflicts_with_all = ["lat", "lon"])]
        country: Option<String>,

        /// City name (with --country).
        #[arg(long, requires = "country")]
        city: Option<String>,

        /// Latitude in decimal degrees (with --lon).
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees (with --lat).
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Unit shown first: "celsius" or "fahrenheit"; defaults to the configured one.
        #[arg(long)]
        unit: Option<String>,

        /// Write the country flag PNG to this path.
        #[arg(long)]
        flag_out: Option<PathBuf>,
    },

    /// Rank every city of a country by current temperature. Ctrl-C stops early.
    Rank {
        /// Country name or two-letter code.
        country: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Countries { country } => list(&config, country.as_deref()).await,
            Command::Show { country, city, lat, lon, unit, flag_out } => {
                let unit = match unit {
                    Some(u) => TemperatureUnit::try_from(u.as_str())?,
                    None => config.default_unit()?,
                };
                let target = match (country, city, lat, lon) {
                    (Some(country), Some(city), None, None) => Target::City { country, city },
                    (None, None, Some(latitude), Some(longitude)) => {
                        Target::Coordinates { latitude, longitude }
                    }
                    _ => bail!("Specify either --country and --city, or --lat and --lon."),
                };
                show(&config, target, unit, flag_out).await
            }
            Command::Rank { country } => rank(&config, &country).await,
        }
    }
}

enum Target {
    City { country: String, city: String },
    Coordinates { latitude: f64, longitude: f64 },
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.database_path().display().to_string();
    let database = Text::new("Locations database path:")
        .with_default(&current)
        .prompt()
        .context("Configuration aborted")?;
    config.database_path = Some(PathBuf::from(database));

    let unit = Select::new("Preferred temperature unit:", TemperatureUnit::all().to_vec())
        .prompt()
        .context("Configuration aborted")?;
    config.set_default_unit(unit);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn load_countries(config: &Config) -> anyhow::Result<Vec<Country>> {
    let store = LocationStore::new(config.database_path());
    tracing::debug!(path = %store.path().display(), "loading locations");

    let countries = tokio::task::spawn_blocking(move || store.list_countries())
        .await
        .context("Locations database task failed")?
        .context(
            "Could not get coordinates database. Only coordinate lookups (--lat/--lon) are available",
        )?;
    tracing::debug!(countries = countries.len(), "locations loaded");
    Ok(countries)
}

async fn list(config: &Config, country: Option<&str>) -> anyhow::Result<()> {
    let countries = load_countries(config).await?;

    match country {
        None => render::print_countries(&countries),
        Some(name) => {
            let country = find_country(&countries, name)
                .ok_or_else(|| anyhow!("Unknown country '{name}'. Hint: run `weather countries`."))?;
            render::print_cities(country);
        }
    }
    Ok(())
}

async fn show(
    config: &Config,
    target: Target,
    unit: TemperatureUnit,
    flag_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let location = match target {
        Target::City { country, city } => {
            let countries = load_countries(config).await?;
            let (country, city) = find_city(&countries, &country, &city).ok_or_else(|| {
                anyhow!("Unknown city '{city}' in '{country}'. Hint: run `weather countries {country}`.")
            })?;
            resolve(Selection::City { country, city })
        }
        Target::Coordinates { latitude, longitude } => {
            resolve(Selection::Coordinates { latitude, longitude })
        }
    };

    let http = build_client(&config.http).context("Failed to build HTTP client")?;
    let weather = Arc::new(OpenMeteoProvider::new(http.clone(), config.services.weather_url.clone()));
    let orchestrator = WeatherOrchestrator::new(weather, GeoClient::new(http, config.services.clone()));

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(render::print_display_events(rx, unit, flag_out));

    let result = orchestrator.fetch(&location, &tx).await;
    drop(tx);
    printer.await.context("Output task failed")??;

    match result {
        Some(Ok(_)) => Ok(()),
        Some(Err(e)) => Err(e.into()),
        None => bail!("A fetch is already running"),
    }
}

async fn rank(config: &Config, name: &str) -> anyhow::Result<()> {
    let countries = load_countries(config).await?;
    let country = find_country(&countries, name)
        .ok_or_else(|| anyhow!("Unknown country '{name}'. Hint: run `weather countries`."))?;

    let http = build_client(&config.http).context("Failed to build HTTP client")?;
    let job = CountryRankingJob::new(Arc::new(OpenMeteoProvider::new(
        http,
        config.services.weather_url.clone(),
    )));

    let stop = job.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the current city...");
            tracing::debug!("ranking stop requested");
            stop.stop();
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(render::print_progress(rx));

    let outcome = job
        .run(country, &tx)
        .await
        .ok_or_else(|| anyhow!("A ranking is already running"))?;
    drop(tx);
    progress.await.context("Output task failed")?;

    render::print_ranking(country, outcome.results());
    if let Some(notice) = outcome.notice() {
        eprintln!("{notice}");
    }

    match outcome {
        RankingOutcome::Failed { error, .. } => {
            Err(anyhow::Error::new(error).context("Could not retrieve temperatures"))
        }
        RankingOutcome::Completed(_) | RankingOutcome::Stopped(_) => Ok(()),
    }
}
