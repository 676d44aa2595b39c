//! Batch job ranking every city of a country by current temperature.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    busy::BusyFlag,
    error::FetchError,
    model::{CityTemperature, Country},
    provider::WeatherProvider,
};

/// Cooperative stop request for a running job.
///
/// The job only looks at it before starting each city; a request already in
/// flight is allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingEvent {
    Progress { completed: usize, total: usize },
}

#[derive(Debug)]
pub enum RankingOutcome {
    /// Every city answered; sorted ascending by temperature.
    Completed(Vec<CityTemperature>),
    /// Stopped on request; the cities done so far, sorted.
    Stopped(Vec<CityTemperature>),
    /// A weather request failed; the cities done so far, in store order.
    Failed {
        partial: Vec<CityTemperature>,
        error: FetchError,
    },
}

impl RankingOutcome {
    pub fn results(&self) -> &[CityTemperature] {
        match self {
            RankingOutcome::Completed(r) | RankingOutcome::Stopped(r) => r,
            RankingOutcome::Failed { partial, .. } => partial,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RankingOutcome::Completed(_))
    }

    /// Message for the user when the results may be incomplete.
    pub fn notice(&self) -> Option<String> {
        match self {
            RankingOutcome::Completed(_) => None,
            RankingOutcome::Stopped(_) => {
                Some("The process was stopped. It's possible that the results are incomplete".into())
            }
            RankingOutcome::Failed { error, .. } => Some(format!(
                "Error while trying to get all temperatures. Possible incomplete results. {error}"
            )),
        }
    }
}

/// Sort ascending by temperature; ties keep their original order.
pub fn rank(results: &mut [CityTemperature]) {
    results.sort_by(|a, b| a.temperature_c.total_cmp(&b.temperature_c));
}

#[derive(Debug)]
pub struct CountryRankingJob {
    weather: Arc<dyn WeatherProvider>,
    stop: StopHandle,
    busy: BusyFlag,
}

impl CountryRankingJob {
    /// `weather` should not be shared with any other consumer.
    pub fn new(weather: Arc<dyn WeatherProvider>) -> Self {
        Self { weather, stop: StopHandle::default(), busy: BusyFlag::new() }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_running(&self) -> bool {
        self.busy.is_busy()
    }

    /// Query every city of `country` in order and rank the results.
    ///
    /// Returns `None` without doing anything if the job is already running.
    /// Progress is published on `events` after each city.
    pub async fn run(
        &self,
        country: &Country,
        events: &UnboundedSender<RankingEvent>,
    ) -> Option<RankingOutcome> {
        let Some(_busy) = self.busy.try_acquire() else {
            tracing::debug!(country = %country.name, "ranking already running, request ignored");
            return None;
        };
        self.stop.reset();

        let total = country.cities.len();
        let mut results = Vec::with_capacity(total);

        for (index, city) in country.cities.iter().enumerate() {
            if self.stop.is_stopped() {
                tracing::info!(country = %country.name, done = index, total, "ranking stopped");
                rank(&mut results);
                return Some(RankingOutcome::Stopped(results));
            }

            if let Err(error) = self.weather.update(city.latitude, city.longitude).await {
                tracing::warn!(country = %country.name, city = %city.name, %error, "ranking failed");
                return Some(RankingOutcome::Failed { partial: results, error });
            }

            results.push(CityTemperature {
                city: city.name.clone(),
                admin: city.admin.clone(),
                temperature_c: self.weather.snapshot().map_or(0.0, |s| s.temperature_c),
            });
            let _ = events.send(RankingEvent::Progress { completed: index + 1, total });
        }

        rank(&mut results);
        tracing::info!(country = %country.name, cities = total, "ranking complete");
        Some(RankingOutcome::Completed(results))
    }
}
