use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::Cell;
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use validator::Validate;

use weather_ingest::error::{ProcessingError, Result};
use weather_ingest::models::{RawObservation, Schema};
use weather_ingest::processors::{IngestProcessor, IncrementalMerger, ObservationExtractor};
use weather_ingest::readers::{
    parse_observations, DatasetReader, NoopSleeper, ObservationSource, Sleeper, WindowedFetcher,
};
use weather_ingest::utils::{recent_output_path, ProgressReporter};
use weather_ingest::writers::{DatasetWriter, WriteMode};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    base() + Duration::days(21)
}

/// Serves a GeoJSON body with one observation every 20 minutes per window.
/// Temperature climbs 0.1 degC per hour since `base()` so rows never collide
/// under the duplicate tolerance.
struct FixtureSource {
    calls: Cell<usize>,
    fail_on_call: Option<usize>,
}

impl FixtureSource {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: Cell::new(0),
            fail_on_call: Some(call),
        }
    }

    fn body(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let mut features = Vec::new();
        let mut t = start;
        while t < end {
            let hours = (t - base()).num_minutes() as f64 / 60.0;
            features.push(json!({
                "properties": {
                    "timestamp": t.to_rfc3339(),
                    "temperature": {"unitCode": "wmoUnit:degC", "value": hours * 0.1},
                    "barometricPressure": {"unitCode": "wmoUnit:Pa", "value": 101325.0},
                    "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 65.0},
                    "windSpeed": {"unitCode": "wmoUnit:m_s-1", "value": 4.6},
                    "windDirection": {"unitCode": "wmoUnit:degree_(angle)", "value": 300.0}
                }
            }));
            t += Duration::minutes(20);
        }
        // Service order is newest first
        features.reverse();
        json!({"type": "FeatureCollection", "features": features}).to_string()
    }
}

impl ObservationSource for FixtureSource {
    fn fetch_observations(
        &self,
        _station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _limit: Option<usize>,
    ) -> Result<Vec<RawObservation>> {
        let call = self.calls.get() + 1;
        self.calls.set(call);

        if self.fail_on_call == Some(call) {
            return Err(ProcessingError::UpstreamStatus {
                status: 503,
                url: format!("fixture://window/{}", call),
            });
        }
        parse_observations(&Self::body(start, end))
    }
}

#[derive(Default)]
struct CountingSleeper {
    sleeps: Cell<usize>,
}

impl Sleeper for &CountingSleeper {
    fn sleep(&self, duration: StdDuration) {
        assert_eq!(duration, StdDuration::from_secs(1));
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

#[test]
fn test_historical_pipeline_writes_hourly_core_dataset() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("historical_data.csv");

    let fetcher = WindowedFetcher::new(FixtureSource::new()).with_sleeper(NoopSleeper);
    let records = IngestProcessor::new(fetcher).historical("KMSP", 21, now(), None)?;

    assert_eq!(records.len(), 21 * 24);

    let summary = DatasetWriter::new().write(&path, &records, WriteMode::Overwrite, Schema::Core)?;
    assert_eq!(summary.written_rows, 21 * 24);

    let content = std::fs::read_to_string(&path)?;
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("temperature,pressure,humidity,wind_speed,wind_direction,precipitation")
    );
    assert_eq!(lines.next(), Some("32.0,29.92,65.0,10.29,300.0,0.0"));
    assert_eq!(lines.next(), Some("32.18,29.92,65.0,10.29,300.0,0.0"));
    assert_eq!(content.lines().count(), 21 * 24 + 1);
    Ok(())
}

#[test]
fn test_failed_middle_window_is_skipped() -> Result<()> {
    let source = FixtureSource::failing_on(2);
    let sleeper = CountingSleeper::default();
    let fetcher = WindowedFetcher::new(source).with_sleeper(&sleeper);
    let processor = IngestProcessor::new(fetcher);

    let progress = ProgressReporter::silent();
    let records = processor.historical("KMSP", 21, now(), Some(&progress))?;

    assert_eq!(processor.fetcher().source().calls.get(), 3);
    assert_eq!(sleeper.sleeps.get(), 2);
    assert_eq!(records.len(), 2 * 7 * 24);

    let gap_start = base() + Duration::days(7);
    let gap_end = base() + Duration::days(14);
    assert!(records.iter().all(|r| {
        let ts = r.timestamp.map(|t| t.with_timezone(&Utc));
        ts.map_or(false, |t| t < gap_start || t >= gap_end)
    }));

    for pair in records.windows(2) {
        let a = pair[0].unix_timestamp().unwrap();
        let b = pair[1].unix_timestamp().unwrap();
        assert!(b - a >= 3600);
    }
    Ok(())
}

#[test]
fn test_reingesting_same_data_appends_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("historical_data.csv");
    let writer = DatasetWriter::new();

    let fetcher = WindowedFetcher::new(FixtureSource::new()).with_sleeper(NoopSleeper);
    let records = IngestProcessor::new(fetcher).historical("KMSP", 3, now(), None)?;

    let first = writer.write(&path, &records, WriteMode::Incremental, Schema::Core)?;
    assert!(first.created);
    let before = std::fs::read_to_string(&path)?;

    let second = writer.write(&path, &records, WriteMode::Incremental, Schema::Core)?;
    assert_eq!(second.written_rows, 0);
    assert_eq!(second.existing_rows, records.len());
    assert_eq!(std::fs::read_to_string(&path)?, before);
    Ok(())
}

#[test]
fn test_merge_against_reloaded_file_is_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data.csv");

    let fetcher = WindowedFetcher::new(FixtureSource::new()).with_sleeper(NoopSleeper);
    let records = IngestProcessor::new(fetcher).historical("KMSP", 2, now(), None)?;
    DatasetWriter::new().write(&path, &records, WriteMode::Overwrite, Schema::Core)?;

    let existing = DatasetReader::new(Schema::Core).load(&path)?;
    let delta = IncrementalMerger::new().merge(&records, &existing);
    assert!(delta.is_empty());
    Ok(())
}

#[test]
fn test_timestamped_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("timed.csv");

    let fetcher = WindowedFetcher::new(FixtureSource::new()).with_sleeper(NoopSleeper);
    let records = IngestProcessor::new(fetcher).historical("KMSP", 1, now(), None)?;

    DatasetWriter::new().write(&path, &records, WriteMode::Overwrite, Schema::Timestamped)?;

    assert_eq!(DatasetReader::detect_schema(&path)?, Schema::Timestamped);
    let loaded = DatasetReader::new(Schema::Timestamped).load(&path)?;
    assert_eq!(loaded, records);
    Ok(())
}

#[test]
fn test_missing_measurements_use_fallbacks() -> Result<()> {
    let body = json!({
        "features": [{
            "properties": {
                "timestamp": "2024-01-15T12:53:00+00:00",
                "temperature": {"unitCode": "wmoUnit:degC", "value": null},
                "barometricPressure": null,
                "windSpeed": {"unitCode": "wmoUnit:m_s-1", "value": null}
            }
        }]
    })
    .to_string();

    let raw = parse_observations(&body)?;
    let records = ObservationExtractor::new().extract_all(&raw);
    assert_eq!(records.len(), 1);
    assert!(records[0].validate().is_ok());

    let dir = TempDir::new()?;
    let path = dir.path().join("fallback.csv");
    DatasetWriter::new().write(&path, &records, WriteMode::Overwrite, Schema::Core)?;

    let content = std::fs::read_to_string(&path)?;
    assert_eq!(content.lines().nth(1), Some("50.0,30.0,60.0,8.0,180.0,0.0"));
    Ok(())
}

#[test]
fn test_unit_conversion_is_exact_after_rounding() -> Result<()> {
    let body = json!({
        "features": [{
            "properties": {
                "timestamp": "2024-03-10T06:00:00-06:00",
                "temperature": {"unitCode": "wmoUnit:degC", "value": 10.0},
                "barometricPressure": {"unitCode": "wmoUnit:Pa", "value": 101325.0},
                "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 65.456},
                "windSpeed": {"unitCode": "wmoUnit:m_s-1", "value": 10.0},
                "windDirection": {"unitCode": "wmoUnit:degree_(angle)", "value": 225.0}
            }
        }]
    })
    .to_string();

    let raw = parse_observations(&body)?;
    let record = ObservationExtractor::new().try_extract(&raw[0])?;

    assert_eq!(record.temperature, 50.0);
    assert_eq!(record.pressure, 29.92);
    assert_eq!(record.humidity, 65.46);
    assert_eq!(record.wind_speed, 22.37);
    assert_eq!(record.wind_direction, 225.0);
    assert_eq!(record.precipitation, 0.0);
    assert_eq!(record.iso_timestamp().as_deref(), Some("2024-03-10T06:00:00-06:00"));
    Ok(())
}

#[test]
fn test_recent_mode_writes_two_latest_to_recent_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = recent_output_path(&dir.path().join("historical_data.csv"));
    assert!(path.ends_with("historical_data_recent.csv"));

    let fetcher = WindowedFetcher::new(FixtureSource::new()).with_sleeper(NoopSleeper);
    let records = IngestProcessor::new(fetcher).recent("KMSP", 48, now())?;
    assert_eq!(records.len(), 2);

    DatasetWriter::new().write(&path, &records, WriteMode::Overwrite, Schema::Timestamped)?;
    let loaded = DatasetReader::new(Schema::Timestamped).load(&path)?;

    let newest = now() - Duration::minutes(20);
    assert_eq!(loaded[1].unix_timestamp(), Some(newest.timestamp()));
    assert!(loaded[0].timestamp < loaded[1].timestamp);
    Ok(())
}
