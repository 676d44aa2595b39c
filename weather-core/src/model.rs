use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::{error::FormatError, units::celsius_to_fahrenheit};

/// A city from the locations database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    /// Administrative region label; empty when the database has none.
    pub admin: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A country and its cities, sorted by name at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// Two-letter code used as the key for flag lookups.
    pub iso2: String,
    pub cities: Vec<City>,
}

// iso2 does not take part in equality.
impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.cities == other.cities
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How the user picked the location being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    ByCity,
    ByCoordinates,
}

/// Coordinates plus whatever naming information is known up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub mode: FetchMode,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: Option<String>,
    pub country_code: Option<String>,
}

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit]
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// One decoded current-weather reading.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub weather_code: i32,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

impl WeatherSnapshot {
    pub fn description(&self) -> &'static str {
        describe_weather_code(self.weather_code)
    }

    /// Temperature of this reading in `unit`; Fahrenheit is rounded half-even to 2 decimals.
    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temperature_c,
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(self.temperature_c),
        }
    }
}

/// Map a WMO weather interpretation code to its textual category.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Mainly clear, partly cloudy, and overcast",
        45 | 48 => "Fog and depositing rime fog",
        51 | 53 | 55 => "Drizzle: Light, moderate, and dense intensity",
        56 | 57 => "Freezing Drizzle: Light and dense intensity",
        61 | 63 | 65 => "Rain: Slight, moderate and heavy intensity",
        66 | 67 => "Freezing Rain: Light and heavy intensity",
        71 | 73 | 75 => "Snow fall: Slight, moderate, and heavy intensity",
        77 => "Snow grains",
        80..=82 => "Rain showers: Slight, moderate, and violent",
        85 | 86 => "Snow showers slight and heavy",
        95 => "Thunderstorm: Slight or moderate",
        96 | 99 => "Thunderstorm with slight and heavy hail",
        _ => "Unknown",
    }
}

/// Local time components as reported by the time service.
///
/// Fields are taken as-is; they are only checked when composed into a
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    #[serde(rename = "seconds")]
    pub second: i32,
    #[serde(rename = "milliSeconds")]
    pub millisecond: i32,
}

impl CurrentTime {
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, FormatError> {
        let invalid = || FormatError(format!("{self:?}"));
        let unsigned = |v: i32| u32::try_from(v).map_err(|_| invalid());

        let date = NaiveDate::from_ymd_opt(self.year, unsigned(self.month)?, unsigned(self.day)?)
            .ok_or_else(invalid)?;

        date.and_hms_milli_opt(
            unsigned(self.hour)?,
            unsigned(self.minute)?,
            unsigned(self.second)?,
            unsigned(self.millisecond)?,
        )
        .ok_or_else(invalid)
    }
}

/// One row of a country ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CityTemperature {
    pub city: String,
    pub admin: String,
    pub temperature_c: f64,
}
