use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::config::FallbackDefaults;
use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalRecord, Measurement, RawObservation};
use crate::utils::constants::{CONTINUOUS_DECIMALS, DIRECTION_DECIMALS};
use crate::utils::{normalize, round_to, wrap_degrees};

/// Maps raw service observations onto canonical records
pub struct ObservationExtractor {
    defaults: FallbackDefaults,
}

impl ObservationExtractor {
    pub fn new() -> Self {
        Self {
            defaults: FallbackDefaults::default(),
        }
    }

    pub fn with_defaults(defaults: FallbackDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &FallbackDefaults {
        &self.defaults
    }

    /// Extract one observation, or `None` when it has no usable timestamp
    pub fn extract(&self, raw: &RawObservation) -> Option<CanonicalRecord> {
        match self.try_extract(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(
                    event_type = "observation_skipped",
                    timestamp = raw.timestamp().unwrap_or_default(),
                    error = %e,
                    "Skipping observation"
                );
                None
            }
        }
    }

    /// Extract one observation. Fails with `MissingData` when the timestamp is
    /// absent and `DateParse` when it is not RFC 3339.
    pub fn try_extract(&self, raw: &RawObservation) -> Result<CanonicalRecord> {
        let timestamp = raw
            .timestamp()
            .ok_or_else(|| ProcessingError::MissingData("observation timestamp".to_string()))
            .and_then(parse_timestamp)?;

        let props = &raw.properties;
        let temperature =
            measured_or(props.temperature.as_ref(), self.defaults.temperature_default);
        let pressure = measured_or(
            props.barometric_pressure.as_ref(),
            self.defaults.pressure_default,
        );
        let humidity = measured_or(
            props.relative_humidity.as_ref(),
            self.defaults.humidity_default,
        );
        let wind_speed = measured_or(props.wind_speed.as_ref(), self.defaults.wind_speed_default);
        let wind_direction = measured_or(
            props.wind_direction.as_ref(),
            self.defaults.wind_direction_default,
        );

        Ok(CanonicalRecord::new(
            Some(timestamp),
            round_to(temperature, CONTINUOUS_DECIMALS),
            round_to(pressure, CONTINUOUS_DECIMALS),
            round_to(humidity, CONTINUOUS_DECIMALS),
            round_to(wind_speed, CONTINUOUS_DECIMALS),
            wrap_degrees(round_to(wind_direction, DIRECTION_DECIMALS)),
            // Observations carry no precipitation signal
            0.0,
        ))
    }

    /// Extract a batch, dropping observations that cannot be ordered
    pub fn extract_all(&self, raw: &[RawObservation]) -> Vec<CanonicalRecord> {
        let records: Vec<CanonicalRecord> = raw.iter().filter_map(|r| self.extract(r)).collect();

        if records.len() < raw.len() {
            debug!(
                event_type = "extraction_summary",
                input = raw.len(),
                extracted = records.len(),
                "Dropped observations without a usable timestamp"
            );
        }

        records
    }
}

impl Default for ObservationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn measured_or(measurement: Option<&Measurement>, fallback: f64) -> f64 {
    match measurement {
        Some(m) if m.value.is_some() => normalize(m.value, &m.unit_code),
        _ => fallback,
    }
}

/// Parse an ISO-8601 timestamp, accepting a trailing `Z`
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    Ok(DateTime::parse_from_rfc3339(raw.trim())?)
}
