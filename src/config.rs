//! Layered runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! and `WEATHER_INGEST__*` environment variables (`__` separates nesting, so
//! `WEATHER_INGEST__API__TIMEOUT_SECS=10` sets `api.timeout_secs`). CLI flags
//! are applied on top by the command layer.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;

/// Values substituted when an observation lacks a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackDefaults {
    pub temperature_default: f64,
    pub pressure_default: f64,
    pub humidity_default: f64,
    pub wind_speed_default: f64,
    pub wind_direction_default: f64,
}

impl Default for FallbackDefaults {
    fn default() -> Self {
        Self {
            temperature_default: DEFAULT_TEMPERATURE_F,
            pressure_default: DEFAULT_PRESSURE_INHG,
            humidity_default: DEFAULT_HUMIDITY_PCT,
            wind_speed_default: DEFAULT_WIND_SPEED_MPH,
            wind_direction_default: DEFAULT_WIND_DIRECTION_DEG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub window_days: i64,
    pub pacing_millis: u64,
    pub recent_limit: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: NOAA_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            window_days: DEFAULT_WINDOW_DAYS,
            pacing_millis: DEFAULT_PACING_MILLIS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_millis)
    }

    /// Window length, clamped to `1..=MAX_WINDOW_DAYS`
    pub fn window_span(&self) -> chrono::Duration {
        chrono::Duration::days(self.window_days.clamp(1, MAX_WINDOW_DAYS))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub api: ApiSettings,
    pub fallback: FallbackDefaults,
    pub tolerance: f64,
    pub min_interval_hours: i64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            fallback: FallbackDefaults::default(),
            tolerance: DEFAULT_DEDUP_TOLERANCE,
            min_interval_hours: DEFAULT_MIN_INTERVAL_HOURS,
        }
    }
}

impl IngestConfig {
    /// Load configuration. An explicit `path` must exist; without one the
    /// default `weather-ingest.toml` in the working directory is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: IngestConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ProcessingError::Config(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        if !(0..=MAX_MIN_INTERVAL_HOURS).contains(&self.min_interval_hours) {
            return Err(ProcessingError::Config(format!(
                "min_interval_hours must be between 0 and {}, got {}",
                MAX_MIN_INTERVAL_HOURS, self.min_interval_hours
            )));
        }

        if !(1..=MAX_WINDOW_DAYS).contains(&self.api.window_days) {
            return Err(ProcessingError::Config(format!(
                "api.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.api.window_days
            )));
        }

        if self.api.base_url.trim().is_empty() {
            return Err(ProcessingError::Config(
                "api.base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resampling interval, clamped to `0..=MAX_MIN_INTERVAL_HOURS`
    pub fn min_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.min_interval_hours.clamp(0, MAX_MIN_INTERVAL_HOURS))
    }
}
