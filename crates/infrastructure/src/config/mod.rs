//! Application configuration
//!
//! Split into focused sub-modules:
//! - `station`: feed and snapshot URLs
//! - `store`: Elasticsearch connection and index settings
//! - `schedule`: cycle interval, cron and misfire grace
//!
//! HTTP client settings reuse [`BomConfig`] and logging reuses
//! [`TelemetryConfig`].

mod schedule;
mod station;
mod store;

use std::path::Path;

use integration_bom::BomConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use schedule::ScheduleConfig;
pub use station::StationConfig;
pub use store::StoreConfig;

use crate::scheduler::parse_cron;
use crate::telemetry::TelemetryConfig;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "WEATHER_INDEXER";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Station URLs
    #[serde(default)]
    pub station: StationConfig,

    /// Upstream HTTP client settings
    #[serde(default)]
    pub http: BomConfig,

    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Cycle scheduling
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file and environment
    ///
    /// The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., WEATHER_INDEXER__STORE__URL)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        debug!(?app, "Configuration loaded");
        Ok(app)
    }

    /// Reject values no cycle could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.station
            .source()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.store.url.trim().is_empty() {
            return Err(ConfigError::Invalid("store.url is empty".into()));
        }
        if self.store.index.trim().is_empty() {
            return Err(ConfigError::Invalid("store.index is empty".into()));
        }
        if self.store.index.chars().any(char::is_uppercase) {
            return Err(ConfigError::Invalid(format!(
                "store.index must be lowercase: {}",
                self.store.index
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be > 0".into()));
        }

        let schedule = &self.schedule;
        if schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "schedule.interval_secs must be > 0".into(),
            ));
        }
        if schedule.misfire_grace_secs == 0 {
            return Err(ConfigError::Invalid(
                "schedule.misfire_grace_secs must be > 0".into(),
            ));
        }
        match &schedule.cron {
            Some(expr) => {
                parse_cron(expr)
                    .map_err(|e| ConfigError::Invalid(format!("schedule.cron '{expr}': {e}")))?;
            },
            None if schedule.interval_secs < schedule.misfire_grace_secs => {
                return Err(ConfigError::Invalid(format!(
                    "schedule.interval_secs ({}) is shorter than schedule.misfire_grace_secs ({})",
                    schedule.interval_secs, schedule.misfire_grace_secs
                )));
            },
            None => {},
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::WELLCAMP_FEED_URL;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.station.feed_url, WELLCAMP_FEED_URL);
        assert_eq!(config.store.url, "http://localhost:9200");
        assert_eq!(config.store.index, "weather_index");
        assert_eq!(config.schedule.interval_secs, 300);
        assert_eq!(config.schedule.misfire_grace_secs, 2);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[station]
feed_url = "http://example.test/feed.json"

[store]
url = "http://es:9200"
index = "wellcamp"
username = "elastic"
password = "changeme"
number_of_replicas = 2

[schedule]
interval_secs = 60
cron = "0 */10 * * * *"

[telemetry]
json = true
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.station.feed_url, "http://example.test/feed.json");
        assert_eq!(config.station.image_url, domain::WELLCAMP_IMAGE_URL);
        assert_eq!(config.store.index, "wellcamp");
        assert_eq!(config.store.number_of_replicas, 2);
        assert_eq!(config.store.number_of_shards, 1);
        assert!(config.store.password.is_some());
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.schedule.cron.as_deref(), Some("0 */10 * * * *"));
        assert!(config.telemetry.json);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load_from(Path::new("/nonexistent/weather-indexer.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.schedule.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn interval_shorter_than_grace_is_rejected() {
        let mut config = AppConfig::default();
        config.schedule.interval_secs = 1;
        config.schedule.misfire_grace_secs = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("misfire_grace_secs"));
    }

    #[test]
    fn empty_urls_are_rejected() {
        let mut config = AppConfig::default();
        config.station.image_url = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store.url = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn uppercase_index_is_rejected() {
        let mut config = AppConfig::default();
        config.store.index = "Weather".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_cron_is_rejected() {
        let mut config = AppConfig::default();
        config.schedule.cron = Some("every five minutes".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_misfire_grace_is_rejected() {
        let mut config = AppConfig::default();
        config.schedule.misfire_grace_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("misfire_grace_secs must be > 0"));

        config.schedule.cron = Some("0 */5 * * * *".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn cron_ignores_interval_grace_check() {
        let mut config = AppConfig::default();
        config.schedule.interval_secs = 1;
        config.schedule.misfire_grace_secs = 5;
        config.schedule.cron = Some("0 0,30 * * * *".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn weekday_cron_uses_sunday_zero() {
        let mut config = AppConfig::default();
        config.schedule.cron = Some("0 0 12 * * 0-6".into());
        assert!(config.validate().is_ok());

        config.schedule.cron = Some("0 0 12 * * 1-5".into());
        assert!(config.validate().is_ok());

        config.schedule.cron = Some("0 0 12 * * 8".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn store_config_maps_to_search_config() {
        let store = StoreConfig {
            url: "http://es:9200".into(),
            number_of_replicas: 1,
            ..Default::default()
        };
        let search = store.to_search_config();
        assert_eq!(search.base_url, "http://es:9200");
        assert_eq!(search.number_of_replicas, 1);
        assert_eq!(search.timeout_secs, 30);
    }

    #[test]
    fn store_debug_redacts_password() {
        let store = StoreConfig {
            password: Some(secrecy::SecretString::from("changeme")),
            ..Default::default()
        };
        assert!(!format!("{store:?}").contains("changeme"));
    }

    #[test]
    fn serialized_config_omits_password() {
        let mut config = AppConfig::default();
        config.store.password = Some(secrecy::SecretString::from("changeme"));
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("changeme"));
        assert!(text.contains("weather_index"));
    }
}
