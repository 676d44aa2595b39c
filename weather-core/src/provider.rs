use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{TemperatureUnit, WeatherSnapshot},
};

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Holder of the most recent current-weather reading for one consumer.
///
/// A provider is either empty or loaded with exactly one snapshot. `update`
/// replaces the snapshot as a whole, or clears it when the fetch fails. The
/// getters return zero values while empty; callers must not read those as a
/// real measurement (check [`WeatherProvider::is_concise`]).
///
/// Give every concurrent consumer its own provider instead of sharing one.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current weather for the coordinates.
    async fn update(&self, latitude: f64, longitude: f64) -> Result<(), FetchError>;

    /// Drop the current reading, if any.
    fn invalidate(&self);

    /// Copy of the current reading.
    fn snapshot(&self) -> Option<WeatherSnapshot>;

    /// True while the provider holds a freshly fetched reading.
    fn is_concise(&self) -> bool {
        self.snapshot().is_some()
    }

    fn temperature(&self, unit: TemperatureUnit) -> f64 {
        self.snapshot().map(|s| s.temperature(unit)).unwrap_or(0.0)
    }

    fn weather_description(&self) -> &'static str {
        self.snapshot().map(|s| s.description()).unwrap_or("")
    }

    fn latitude(&self) -> f64 {
        self.snapshot().map(|s| s.latitude).unwrap_or(0.0)
    }

    fn longitude(&self) -> f64 {
        self.snapshot().map(|s| s.longitude).unwrap_or(0.0)
    }
}
