//! Single-location fetch: weather, location name, local time and flag.
//!
//! Steps run in order. Weather is essential and its failure aborts the
//! fetch. In coordinate mode the reverse-geocoding step is essential too,
//! although the weather already published stays visible. Time and flag are
//! decorative: their failures become notices and the fetch carries on.

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    busy::BusyFlag,
    error::FetchError,
    geocode::{DEFAULT_FLAG_SIZE, GeoClient, build_address},
    model::{FetchMode, ResolvedLocation, TemperatureUnit},
    provider::WeatherProvider,
};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Display updates, published in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Weather {
        latitude: f64,
        longitude: f64,
        temperature_c: f64,
        temperature_f: f64,
        description: String,
    },
    Location(String),
    Time(NaiveDateTime),
    Flag { country_code: String, image: Vec<u8> },
    FlagCleared,
    /// A non-fatal problem worth telling the user about.
    Notice(String),
}

/// What happened to the flag image during a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagUpdate {
    /// No country code was known; nothing was requested.
    Unavailable,
    /// Same country as the flag already shown; nothing was requested.
    Unchanged,
    Fetched(Vec<u8>),
    Cleared,
}

/// Everything a successful fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub temperature_f: f64,
    pub description: String,
    pub location: String,
    pub country_code: Option<String>,
    pub local_time: Option<NaiveDateTime>,
    pub flag: FlagUpdate,
    pub notices: Vec<String>,
}

impl WeatherReport {
    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temperature_c,
            TemperatureUnit::Fahrenheit => self.temperature_f,
        }
    }
}

#[derive(Debug)]
pub struct WeatherOrchestrator {
    weather: Arc<dyn WeatherProvider>,
    geo: GeoClient,
    busy: BusyFlag,
    // Country whose flag is currently displayed.
    shown_flag: Mutex<Option<String>>,
}

impl WeatherOrchestrator {
    pub fn new(weather: Arc<dyn WeatherProvider>, geo: GeoClient) -> Self {
        Self {
            weather,
            geo,
            busy: BusyFlag::new(),
            shown_flag: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Forget which flag is displayed, e.g. after the user switches country
    /// or fetch mode, so the next fetch requests it again.
    pub fn forget_flag(&self) {
        *self.shown_flag.lock() = None;
    }

    /// Run a fetch for `location`, publishing display updates on `events`.
    ///
    /// Returns `None` without doing anything if a fetch is already running.
    pub async fn fetch(
        &self,
        location: &ResolvedLocation,
        events: &UnboundedSender<DisplayEvent>,
    ) -> Option<Result<WeatherReport, FetchError>> {
        let Some(_busy) = self.busy.try_acquire() else {
            tracing::debug!("fetch already running, request ignored");
            return None;
        };

        let result = self.run(location, events).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "weather fetch aborted");
        }
        Some(result)
    }

    async fn run(
        &self,
        location: &ResolvedLocation,
        events: &UnboundedSender<DisplayEvent>,
    ) -> Result<WeatherReport, FetchError> {
        let (lat, lon) = (location.latitude, location.longitude);

        self.weather.update(lat, lon).await?;

        // One read, so every field comes from the same update.
        let (temperature_c, temperature_f, description) = match self.weather.snapshot() {
            Some(s) => (
                s.temperature(TemperatureUnit::Celsius),
                s.temperature(TemperatureUnit::Fahrenheit),
                s.description(),
            ),
            None => (0.0, 0.0, ""),
        };

        let mut report = WeatherReport {
            latitude: lat,
            longitude: lon,
            temperature_c,
            temperature_f,
            description: description.to_string(),
            location: String::new(),
            country_code: None,
            local_time: None,
            flag: FlagUpdate::Unavailable,
            notices: Vec::new(),
        };
        publish(
            events,
            DisplayEvent::Weather {
                latitude: lat,
                longitude: lon,
                temperature_c: report.temperature_c,
                temperature_f: report.temperature_f,
                description: report.description.clone(),
            },
        );

        match location.mode {
            FetchMode::ByCity => {
                report.location = location.display_name.clone().unwrap_or_default();
                report.country_code = location.country_code.clone();
            }
            FetchMode::ByCoordinates => {
                let address = self.geo.reverse_geocode(lat, lon).await?;
                report.location = build_address(&address);
                report.country_code = Some(address.parts.country_code.to_uppercase())
                    .filter(|c| !c.trim().is_empty());
            }
        }
        publish(events, DisplayEvent::Location(report.location.clone()));

        self.refresh_time(&mut report, events).await;
        report.flag = self.refresh_flag(&mut report, events).await;

        Ok(report)
    }

    async fn refresh_time(&self, report: &mut WeatherReport, events: &UnboundedSender<DisplayEvent>) {
        let time = match self.geo.current_time(report.latitude, report.longitude).await {
            Ok(t) => t,
            Err(e) => {
                notice(report, events, format!("Could not present time. {e}"));
                return;
            }
        };

        match time.to_naive_datetime() {
            Ok(dt) => {
                report.local_time = Some(dt);
                publish(events, DisplayEvent::Time(dt));
            }
            Err(e) => {
                tracing::debug!(error = %e, "time service returned an invalid date");
                notice(report, events, "Could not present time: invalid format".to_string());
            }
        }
    }

    async fn refresh_flag(
        &self,
        report: &mut WeatherReport,
        events: &UnboundedSender<DisplayEvent>,
    ) -> FlagUpdate {
        let Some(code) = report.country_code.clone() else {
            tracing::debug!("no country code, flag skipped");
            return FlagUpdate::Unavailable;
        };

        if self.shown_flag.lock().as_deref() == Some(code.as_str()) {
            return FlagUpdate::Unchanged;
        }

        let failure = match self.geo.country_flag(&code, DEFAULT_FLAG_SIZE).await {
            Ok(image) if image.starts_with(PNG_SIGNATURE) => {
                *self.shown_flag.lock() = Some(code.clone());
                publish(events, DisplayEvent::Flag { country_code: code, image: image.clone() });
                return FlagUpdate::Fetched(image);
            }
            Ok(_) => "Could not show country flag image. Failed to build image".to_string(),
            Err(e) => format!("Could not retrieve country flag image. {e}"),
        };

        self.forget_flag();
        notice(report, events, failure);
        publish(events, DisplayEvent::FlagCleared);
        FlagUpdate::Cleared
    }
}

fn publish(events: &UnboundedSender<DisplayEvent>, event: DisplayEvent) {
    // The presentation layer may already be gone; nothing left to update then.
    let _ = events.send(event);
}

fn notice(report: &mut WeatherReport, events: &UnboundedSender<DisplayEvent>, message: String) {
    tracing::warn!("{message}");
    report.notices.push(message.clone());
    publish(events, DisplayEvent::Notice(message));
}
