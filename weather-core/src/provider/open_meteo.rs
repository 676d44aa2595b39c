use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::FetchError, http::fetch_json, model::WeatherSnapshot};

use super::WeatherProvider;

const UPDATE_FAILED: &str = "Could not retrieve weather";

/// Open-Meteo backed [`WeatherProvider`].
#[derive(Debug)]
pub struct OpenMeteoProvider {
    http: Client,
    url: String,
    state: Mutex<Option<WeatherSnapshot>>,
    // Serializes whole updates so a slow response cannot overwrite a newer one.
    update_gate: tokio::sync::Mutex<()>,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            state: Mutex::new(None),
            update_gate: tokio::sync::Mutex::new(()),
        }
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, FetchError> {
        let request = self.http.get(&self.url).query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("temperature_unit", "celsius".to_string()),
        ]);

        let parsed: OmResponse = fetch_json(request, UPDATE_FAILED).await?;

        Ok(WeatherSnapshot {
            latitude: parsed.latitude,
            longitude: parsed.longitude,
            temperature_c: parsed.current_weather.temperature,
            weather_code: parsed.current_weather.weathercode,
            wind_speed: parsed.current_weather.windspeed,
            wind_direction: parsed.current_weather.winddirection,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    current_weather: OmCurrentWeather,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn update(&self, latitude: f64, longitude: f64) -> Result<(), FetchError> {
        let _gate = self.update_gate.lock().await;
        tracing::debug!(latitude, longitude, "requesting current weather");

        match self.fetch(latitude, longitude).await {
            Ok(snapshot) => {
                *self.state.lock() = Some(snapshot);
                Ok(())
            }
            Err(e) => {
                *self.state.lock() = None;
                Err(e)
            }
        }
    }

    fn invalidate(&self) {
        *self.state.lock() = None;
    }

    fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.state.lock().clone()
    }
}
