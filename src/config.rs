// Runtime configuration: service endpoint and reservation form layout
// Layered as built-in defaults, then an optional file, then RENTAL__* environment variables

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub const DEFAULT_API_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbxf4B6f19bUAifELWuUtxShErjdFWJv3kCQfwl_zW-yrrtFFMCzWohUkso2PkoY6Aqo/exec";
pub const DEFAULT_RESERVATION_BASE_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSedbtgPQwMnGz-FGpNchCGh0iukiX-2a6TiL9_081A_Lu1yCw/viewform";
pub const DEFAULT_CONFIG_FILE: &str = "config/rental";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid URL in {key}: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub reservation: ReservationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    pub endpoint: String,
    // No timeout when absent
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout_ms: Some(15_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservationConfig {
    pub base_url: String,
    pub prefill_key: String,
    pub prefill_value: String,
    #[serde(default)]
    pub fields: ReservationFieldIds,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RESERVATION_BASE_URL.to_string(),
            prefill_key: "usp".to_string(),
            prefill_value: "pp_url".to_string(),
            fields: ReservationFieldIds::default(),
        }
    }
}

// Identifiers of the reservation form's inputs for each lookup field
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservationFieldIds {
    pub pickup_date: String,
    pub pickup_time: String,
    pub pickup_branch: String,
    pub return_date: String,
    pub return_time: String,
    pub return_branch: String,
}

impl Default for ReservationFieldIds {
    fn default() -> Self {
        Self {
            pickup_date: "entry.1435092602".to_string(),
            pickup_time: "entry.131279204".to_string(),
            pickup_branch: "entry.1888786569".to_string(),
            return_date: "entry.147933508".to_string(),
            return_time: "entry.1669227513".to_string(),
            return_branch: "entry.2017105635".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads from `RENTAL_CONFIG` (or `config/rental`) when present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("RENTAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("RENTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let loaded: AppConfig = settings.try_deserialize()?;
        loaded.check()?;
        Ok(loaded)
    }

    fn check(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.api.endpoint).map_err(|e| ConfigError::InvalidUrl {
            key: "api.endpoint",
            reason: e.to_string(),
        })?;
        reqwest::Url::parse(&self.reservation.base_url).map_err(|e| ConfigError::InvalidUrl {
            key: "reservation.base_url",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
