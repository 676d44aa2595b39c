use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::TemperatureUnit;

pub const DEFAULT_DATABASE_PATH: &str = "./CitiesCoordinates.db";

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub weather_url: String,
    pub geocode_url: String,
    pub time_url: String,
    /// Flag images live at `{flag_url}/{CC}/flat/{size}.png`.
    pub flag_url: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            weather_url: "https://api.open-meteo.com/v1/forecast".into(),
            geocode_url: "https://nominatim.openstreetmap.org/reverse".into(),
            time_url: "https://timeapi.io/api/Time/current/coordinate".into(),
            flag_url: "https://flagsapi.com".into(),
        }
    }
}

impl ServiceEndpoints {
    /// Point every service at one host, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            weather_url: format!("{base}/v1/forecast"),
            geocode_url: format!("{base}/reverse"),
            time_url: format!("{base}/api/Time/current/coordinate"),
            flag_url: base.to_string(),
        }
    }
}

/// HTTP client settings shared by all services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Nominatim rejects requests without an identifying user agent.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 15,
            user_agent: concat!("weather-cli/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path of the locations database; relative paths resolve against the
    /// working directory.
    pub database_path: Option<PathBuf>,

    /// Unit used for the primary temperature reading, e.g. "celsius".
    pub default_unit: Option<String>,

    /// Example TOML:
    /// [services]
    /// weather_url = "https://api.open-meteo.com/v1/forecast"
    pub services: ServiceEndpoints,

    pub http: HttpSettings,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    /// Return the default unit as a strongly-typed TemperatureUnit.
    pub fn default_unit(&self) -> Result<TemperatureUnit> {
        match self.default_unit.as_deref() {
            None => Ok(TemperatureUnit::default()),
            Some(s) => TemperatureUnit::try_from(s)
                .with_context(|| format!("Invalid `default_unit` in {}", Self::describe_path())),
        }
    }

    pub fn set_default_unit(&mut self, unit: TemperatureUnit) {
        self.default_unit = Some(unit.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn describe_path() -> String {
        Self::config_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "config file".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let cfg = Config::default();

        assert_eq!(cfg.database_path(), PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(cfg.default_unit().unwrap(), TemperatureUnit::Celsius);
        assert_eq!(cfg.services, ServiceEndpoints::default());
        assert_eq!(cfg.http.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg = Config::from_toml(
            r#"
            default_unit = "fahrenheit"

            [services]
            time_url = "http://localhost:9000/time"

            [http]
            request_timeout_secs = 30
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.default_unit().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!(cfg.services.time_url, "http://localhost:9000/time");
        assert_eq!(cfg.services.weather_url, ServiceEndpoints::default().weather_url);
        assert_eq!(cfg.http.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.http.connect_timeout_secs, 5);
    }

    #[test]
    fn invalid_unit_is_reported() {
        let mut cfg = Config::default();
        cfg.default_unit = Some("kelvin".into());

        let err = cfg.default_unit().unwrap_err();
        assert!(format!("{err:#}").contains("Unknown temperature unit"));
    }

    #[test]
    fn set_default_unit_overrides() {
        let mut cfg = Config::default();
        cfg.set_default_unit(TemperatureUnit::Fahrenheit);

        assert_eq!(cfg.default_unit.as_deref(), Some("fahrenheit"));
    }

    #[test]
    fn toml_roundtrip_preserves_database_path() {
        let cfg = Config {
            database_path: Some(PathBuf::from("/data/cities.db")),
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        assert_eq!(Config::from_toml(&text).expect("parses"), cfg);
    }

    #[test]
    fn with_base_points_every_service_at_host() {
        let s = ServiceEndpoints::with_base("http://127.0.0.1:8080/");

        assert_eq!(s.weather_url, "http://127.0.0.1:8080/v1/forecast");
        assert_eq!(s.geocode_url, "http://127.0.0.1:8080/reverse");
        assert_eq!(s.time_url, "http://127.0.0.1:8080/api/Time/current/coordinate");
        assert_eq!(s.flag_url, "http://127.0.0.1:8080");
    }
}
