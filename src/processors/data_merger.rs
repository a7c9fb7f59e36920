use tracing::debug;

use crate::models::CanonicalRecord;
use crate::utils::constants::{CONTINUOUS_DECIMALS, DEFAULT_DEDUP_TOLERANCE};
use crate::utils::round_to;

/// Decides whether a freshly fetched record already exists in the dataset.
///
/// Observations have no stable identifier across fetches, so the default
/// policy compares values. An exact key can be plugged in here later without
/// touching the merge loop.
pub trait DuplicatePolicy {
    fn is_duplicate(&self, candidate: &CanonicalRecord, existing: &CanonicalRecord) -> bool;
}

/// Duplicate when temperature, pressure and humidity all differ by strictly
/// less than `tolerance`. Wind, precipitation and timestamp are ignored, so
/// distinct observations under stable weather can collapse into one.
///
/// Differences are taken at the dataset's stored precision, so `32.3` and
/// `32.2` differ by exactly `0.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceMatch {
    pub tolerance: f64,
}

impl ToleranceMatch {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn within(&self, a: f64, b: f64) -> bool {
        round_to((a - b).abs(), CONTINUOUS_DECIMALS) < self.tolerance
    }
}

impl Default for ToleranceMatch {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_TOLERANCE)
    }
}

impl DuplicatePolicy for ToleranceMatch {
    fn is_duplicate(&self, candidate: &CanonicalRecord, existing: &CanonicalRecord) -> bool {
        self.within(candidate.temperature, existing.temperature)
            && self.within(candidate.pressure, existing.pressure)
            && self.within(candidate.humidity, existing.humidity)
    }
}

impl<F> DuplicatePolicy for F
where
    F: Fn(&CanonicalRecord, &CanonicalRecord) -> bool,
{
    fn is_duplicate(&self, candidate: &CanonicalRecord, existing: &CanonicalRecord) -> bool {
        self(candidate, existing)
    }
}

/// Computes the merge delta between new and persisted records
pub struct IncrementalMerger<P: DuplicatePolicy = ToleranceMatch> {
    policy: P,
}

impl IncrementalMerger<ToleranceMatch> {
    pub fn new() -> Self {
        Self {
            policy: ToleranceMatch::default(),
        }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            policy: ToleranceMatch::new(tolerance),
        }
    }
}

impl Default for IncrementalMerger<ToleranceMatch> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DuplicatePolicy> IncrementalMerger<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Records of `new_records` not represented in `existing`, in input order.
    ///
    /// Plain O(N*M) scan; datasets stay in the tens of thousands of rows.
    pub fn merge(
        &self,
        new_records: &[CanonicalRecord],
        existing: &[CanonicalRecord],
    ) -> Vec<CanonicalRecord> {
        if existing.is_empty() {
            return new_records.to_vec();
        }

        let delta: Vec<CanonicalRecord> = new_records
            .iter()
            .filter(|candidate| {
                !existing
                    .iter()
                    .any(|stored| self.policy.is_duplicate(candidate, stored))
            })
            .cloned()
            .collect();

        debug!(
            event_type = "merge_delta",
            candidates = new_records.len(),
            existing = existing.len(),
            delta = delta.len(),
            "Computed merge delta"
        );

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(temperature: f64, pressure: f64, humidity: f64) -> CanonicalRecord {
        CanonicalRecord::new(None, temperature, pressure, humidity, 8.0, 180.0, 0.0)
    }

    #[test]
    fn test_empty_existing_returns_everything() {
        let new_records = vec![record(50.0, 30.0, 60.0), record(51.0, 30.0, 60.0)];
        let merger = IncrementalMerger::new();
        assert_eq!(merger.merge(&new_records, &[]), new_records);
    }

    #[test]
    fn test_near_equal_is_duplicate() {
        let existing = vec![record(50.0, 30.0, 60.0)];
        let new_records = vec![record(50.05, 30.09, 59.95)];

        let merger = IncrementalMerger::new();
        assert!(merger.merge(&new_records, &existing).is_empty());
    }

    #[test]
    fn test_hundredths_apart_by_default_tolerance_are_distinct() {
        let existing = vec![record(32.2, 30.0, 65.4)];
        let new_records = vec![record(32.3, 30.0, 65.4)];

        let merger = IncrementalMerger::new();
        assert_eq!(merger.merge(&new_records, &existing), new_records);
    }

    #[test]
    fn test_default_tolerance_boundary_across_value_range() {
        let policy = ToleranceMatch::default();
        for hundredths in 2_000..9_000 {
            let base = round_to(hundredths as f64 / 100.0, CONTINUOUS_DECIMALS);
            let step = round_to((hundredths + 10) as f64 / 100.0, CONTINUOUS_DECIMALS);
            let near = round_to((hundredths + 9) as f64 / 100.0, CONTINUOUS_DECIMALS);

            assert!(
                !policy.is_duplicate(&record(step, 30.0, 60.0), &record(base, 30.0, 60.0)),
                "{} vs {} should be distinct",
                step,
                base
            );
            assert!(
                policy.is_duplicate(&record(near, 30.0, 60.0), &record(base, 30.0, 60.0)),
                "{} vs {} should match",
                near,
                base
            );
        }
    }

    #[test]
    fn test_difference_of_exactly_tolerance_is_not_duplicate() {
        let existing = vec![record(50.0, 30.0, 60.0)];
        let new_records = vec![record(50.5, 30.0, 60.0)];

        let merger = IncrementalMerger::with_tolerance(0.5);
        assert_eq!(merger.merge(&new_records, &existing), new_records);
    }

    #[test]
    fn test_one_field_outside_tolerance_is_new() {
        let existing = vec![record(50.0, 30.0, 60.0)];
        let new_records = vec![
            record(50.0, 30.0, 61.0),
            record(50.0, 30.2, 60.0),
            record(49.0, 30.0, 60.0),
        ];

        let merger = IncrementalMerger::new();
        assert_eq!(merger.merge(&new_records, &existing).len(), 3);
    }

    #[test]
    fn test_wind_and_precipitation_ignored() {
        let existing = vec![record(50.0, 30.0, 60.0)];
        let mut candidate = record(50.0, 30.0, 60.0);
        candidate.wind_speed = 40.0;
        candidate.wind_direction = 10.0;
        candidate.precipitation = 1.5;

        let merger = IncrementalMerger::new();
        assert!(merger.merge(&[candidate], &existing).is_empty());
    }

    #[test]
    fn test_idempotent_against_itself() {
        let batch = vec![
            record(50.0, 30.0, 60.0),
            record(52.3, 29.8, 55.0),
            record(47.1, 30.4, 80.2),
        ];

        let merger = IncrementalMerger::new();
        assert!(merger.merge(&batch, &batch).is_empty());
    }

    #[test]
    fn test_preserves_input_order() {
        let existing = vec![record(50.0, 30.0, 60.0)];
        let new_records = vec![
            record(60.0, 30.0, 60.0),
            record(50.0, 30.0, 60.0),
            record(40.0, 30.0, 60.0),
        ];

        let delta = IncrementalMerger::new().merge(&new_records, &existing);
        let temps: Vec<f64> = delta.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![60.0, 40.0]);
    }

    #[test]
    fn test_custom_policy() {
        let by_timestamp = |a: &CanonicalRecord, b: &CanonicalRecord| {
            a.timestamp.is_some() && a.timestamp == b.timestamp
        };
        let existing = vec![record(50.0, 30.0, 60.0)];
        let new_records = vec![record(50.0, 30.0, 60.0)];

        // Untimed records never match under a timestamp key
        let merger = IncrementalMerger::with_policy(by_timestamp);
        assert_eq!(merger.merge(&new_records, &existing).len(), 1);
    }
}
