use chrono::{DateTime, FixedOffset};
use validator::Validate;

use crate::config::FallbackDefaults;
use crate::error::Result;
use crate::utils::wrap_degrees;

/// One normalized, unit-converted weather observation.
///
/// Units: °F, inHg, %, mph, degrees, inches.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CanonicalRecord {
    // Absent for rows loaded from a core-schema dataset
    pub timestamp: Option<DateTime<FixedOffset>>,

    pub temperature: f64,

    pub pressure: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,

    #[validate(range(min = 0.0))]
    pub wind_speed: f64,

    #[validate(range(min = 0.0, exclusive_max = 360.0))]
    pub wind_direction: f64,

    #[validate(range(min = 0.0))]
    pub precipitation: f64,
}

impl CanonicalRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: Option<DateTime<FixedOffset>>,
        temperature: f64,
        pressure: f64,
        humidity: f64,
        wind_speed: f64,
        wind_direction: f64,
        precipitation: f64,
    ) -> Self {
        Self {
            timestamp,
            temperature,
            pressure,
            humidity,
            wind_speed,
            wind_direction,
            precipitation,
        }
    }

    pub fn builder() -> CanonicalRecordBuilder {
        CanonicalRecordBuilder::new()
    }

    /// Integer epoch seconds of the timestamp, if any
    pub fn unix_timestamp(&self) -> Option<i64> {
        self.timestamp.map(|ts| ts.timestamp())
    }

    /// RFC 3339 rendering of the timestamp, keeping the source offset
    pub fn iso_timestamp(&self) -> Option<String> {
        self.timestamp.map(|ts| ts.to_rfc3339())
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}

pub struct CanonicalRecordBuilder {
    defaults: FallbackDefaults,
    timestamp: Option<DateTime<FixedOffset>>,
    temperature: Option<f64>,
    pressure: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    precipitation: Option<f64>,
}

impl Default for CanonicalRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalRecordBuilder {
    pub fn new() -> Self {
        Self {
            defaults: FallbackDefaults::default(),
            timestamp: None,
            temperature: None,
            pressure: None,
            humidity: None,
            wind_speed: None,
            wind_direction: None,
            precipitation: None,
        }
    }

    pub fn defaults(mut self, defaults: FallbackDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn pressure(mut self, value: f64) -> Self {
        self.pressure = Some(value);
        self
    }

    pub fn humidity(mut self, value: f64) -> Self {
        self.humidity = Some(value);
        self
    }

    pub fn wind(mut self, speed: f64, direction: f64) -> Self {
        self.wind_speed = Some(speed);
        self.wind_direction = Some(direction);
        self
    }

    pub fn precipitation(mut self, value: f64) -> Self {
        self.precipitation = Some(value);
        self
    }

    /// Fill unset measurements from the fallback set and validate ranges
    pub fn build(self) -> Result<CanonicalRecord> {
        let record = CanonicalRecord {
            timestamp: self.timestamp,
            temperature: self.temperature.unwrap_or(self.defaults.temperature_default),
            pressure: self.pressure.unwrap_or(self.defaults.pressure_default),
            humidity: self.humidity.unwrap_or(self.defaults.humidity_default),
            wind_speed: self.wind_speed.unwrap_or(self.defaults.wind_speed_default),
            wind_direction: wrap_degrees(
                self.wind_direction
                    .unwrap_or(self.defaults.wind_direction_default),
            ),
            precipitation: self.precipitation.unwrap_or(0.0),
        };

        record.validate()?;
        Ok(record)
    }
}
