//! Reverse geocoding, local time and flag image lookups.
//!
//! Each call is independent: no state is kept between requests.

use reqwest::{Client, header::ACCEPT_LANGUAGE};
use serde::{Deserialize, Deserializer, de};

use crate::{
    config::ServiceEndpoints,
    error::FetchError,
    http::{fetch_bytes, fetch_json},
    model::CurrentTime,
};

pub const DEFAULT_FLAG_SIZE: u32 = 64;

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";
const GEOCODE_FAILED: &str = "Could not retrieve coordinates name";
const TIME_FAILED: &str = "Could not determine time";
const FLAG_FAILED: &str = "Could not get country flag image";

/// Reverse geocoding result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Address {
    #[serde(rename = "lat", deserialize_with = "number_or_string")]
    pub latitude: f64,
    #[serde(rename = "lon", deserialize_with = "number_or_string")]
    pub longitude: f64,
    pub display_name: String,
    #[serde(rename = "address")]
    pub parts: AddressParts,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressParts {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub country: String,
    pub country_code: String,
}

/// Text shown for a reverse-geocoded location.
///
/// Falls back to the full display name when neither city nor state is known;
/// otherwise joins the non-blank parts of city, state and country.
pub fn build_address(address: &Address) -> String {
    let parts = &address.parts;
    if parts.city.trim().is_empty() && parts.state.trim().is_empty() {
        return address.display_name.clone();
    }

    [&parts.city, &parts.state, &parts.country]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client for the geocoding, time and flag services.
#[derive(Debug, Clone)]
pub struct GeoClient {
    http: Client,
    endpoints: ServiceEndpoints,
}

impl GeoClient {
    pub fn new(http: Client, endpoints: ServiceEndpoints) -> Self {
        Self { http, endpoints }
    }

    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Address, FetchError> {
        tracing::debug!(latitude, longitude, "reverse geocoding");
        let request = self
            .http
            .get(&self.endpoints.geocode_url)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ]);

        fetch_json(request, GEOCODE_FAILED).await
    }

    pub async fn current_time(&self, latitude: f64, longitude: f64) -> Result<CurrentTime, FetchError> {
        tracing::debug!(latitude, longitude, "requesting local time");
        let request = self.http.get(&self.endpoints.time_url).query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ]);

        fetch_json(request, TIME_FAILED).await
    }

    /// Raw PNG bytes of the country's flag; decoding is up to the caller.
    pub async fn country_flag(&self, country_code: &str, size: u32) -> Result<Vec<u8>, FetchError> {
        let url = format!(
            "{}/{}/flat/{}.png",
            self.endpoints.flag_url.trim_end_matches('/'),
            country_code,
            size
        );
        tracing::debug!(%url, "requesting flag image");

        fetch_bytes(self.http.get(url), FLAG_FAILED).await
    }
}

// Nominatim sends coordinates as strings.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}
