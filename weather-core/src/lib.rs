//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Read-only access to the local countries/cities database
//! - Clients for the weather, geocoding, time and flag services
//! - The single-location fetch flow and the country ranking job
//!
//! It is used by `weather-cli`, but can be driven by any presentation layer:
//! results come back as plain values and ordered channel events.

pub mod busy;
pub mod config;
pub mod error;
pub mod geocode;
pub mod http;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod ranking;
pub mod resolver;
pub mod store;
pub mod units;

pub use config::{Config, HttpSettings, ServiceEndpoints};
pub use error::{FetchError, FormatError, StoreError};
pub use geocode::{Address, GeoClient, build_address};
pub use model::{
    City, CityTemperature, Country, CurrentTime, FetchMode, ResolvedLocation, TemperatureUnit,
    WeatherSnapshot, describe_weather_code,
};
pub use orchestrator::{DisplayEvent, FlagUpdate, WeatherOrchestrator, WeatherReport};
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use ranking::{CountryRankingJob, RankingEvent, RankingOutcome, StopHandle};
pub use resolver::{Selection, resolve};
pub use store::LocationStore;
