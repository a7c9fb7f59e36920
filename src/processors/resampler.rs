use chrono::Duration;
use tracing::debug;

use crate::models::CanonicalRecord;
use crate::utils::constants::{DEFAULT_MIN_INTERVAL_HOURS, MAX_MIN_INTERVAL_HOURS};

/// Greedy forward thinning to a minimum spacing between kept records.
///
/// Excess samples are discarded, not aggregated.
pub struct Resampler {
    min_interval: Duration,
}

impl Resampler {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// Interval in whole hours, clamped to `0..=MAX_MIN_INTERVAL_HOURS`
    pub fn with_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours.clamp(0, MAX_MIN_INTERVAL_HOURS)))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sort by timestamp (stable) and keep a record only when it is at least
    /// `min_interval` after the previously kept one. The first is always kept.
    pub fn resample(&self, records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
        let input_len = records.len();

        // Rows without a timestamp cannot be placed on the time axis
        let mut timed: Vec<CanonicalRecord> =
            records.into_iter().filter(|r| r.has_timestamp()).collect();
        timed.sort_by_key(|r| r.timestamp);

        let mut kept: Vec<CanonicalRecord> = Vec::with_capacity(timed.len());
        for record in timed {
            let far_enough = match (kept.last().and_then(|k| k.timestamp), record.timestamp) {
                (Some(last), Some(current)) => current.signed_duration_since(last) >= self.min_interval,
                _ => true,
            };

            if far_enough {
                kept.push(record);
            }
        }

        debug!(
            event_type = "resample_complete",
            input = input_len,
            output = kept.len(),
            min_interval_secs = self.min_interval.num_seconds(),
            "Resampled observations"
        );

        kept
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::with_hours(DEFAULT_MIN_INTERVAL_HOURS)
    }
}
