//! Service configuration loaded from `meteo.toml`.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! The path is taken from the command line, then the `METEO_CONFIG`
//! environment variable (a `.env` file is honoured), then `./meteo.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::alert::AlertThresholds;
use crate::logging::{self, LogLevel, Source};

pub const DEFAULT_CONFIG_PATH: &str = "./meteo.toml";
pub const CONFIG_ENV_VAR: &str = "METEO_CONFIG";
pub const MAX_HISTORICAL_LAG_DAYS: i64 = 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML error in {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api: ApiConfig,
    pub thresholds: AlertThresholds,
    pub logging: LoggingConfig,
}

/// Open-Meteo endpoints and request shaping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub forecast_url: String,
    pub archive_url: String,
    pub forecast_days: u32,
    pub timeout_secs: u64,
    /// The archive only serves dates at least this many days in the past.
    pub historical_lag_days: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            forecast_days: 7,
            timeout_secs: 30,
            historical_lag_days: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

impl ServiceConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                logging::debug(
                    Source::Config,
                    None,
                    &format!("{} not found, using defaults", path.display()),
                );
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate().map_err(ConfigError::Invalid)?;
        if self.api.forecast_days == 0 || self.api.forecast_days > 16 {
            return Err(ConfigError::Invalid(format!(
                "api.forecast_days must be between 1 and 16, got {}",
                self.api.forecast_days
            )));
        }
        if !(0..=MAX_HISTORICAL_LAG_DAYS).contains(&self.api.historical_lag_days) {
            return Err(ConfigError::Invalid(format!(
                "api.historical_lag_days must be between 0 and {}, got {}",
                MAX_HISTORICAL_LAG_DAYS, self.api.historical_lag_days
            )));
        }
        Ok(())
    }
}

/// Chooses the configuration path: explicit argument, then `METEO_CONFIG`,
/// then [`DEFAULT_CONFIG_PATH`].
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    dotenv::dotenv().ok();
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
