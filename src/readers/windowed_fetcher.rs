use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ApiSettings;
use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalRecord, RawObservation};
use crate::processors::ObservationExtractor;
use crate::readers::noaa_client::ObservationSource;
use crate::utils::constants::{
    DEFAULT_PACING_MILLIS, DEFAULT_RECENT_LIMIT, DEFAULT_WINDOW_DAYS, MAX_DAYS, MAX_RECENT_HOURS,
    RECENT_RECORD_COUNT,
};
use crate::utils::ProgressReporter;

/// Blocking pause between consecutive requests
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock pause
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Skips pacing entirely
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {}
}

/// Split `[start, end)` into consecutive windows no longer than `span`
pub fn split_windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    span: ChronoDuration,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    if start >= end {
        return Vec::new();
    }
    if span <= ChronoDuration::zero() {
        return vec![(start, end)];
    }

    let mut windows = Vec::new();
    let mut current = start;
    while current < end {
        let window_end = std::cmp::min(current + span, end);
        windows.push((current, window_end));
        current = window_end;
    }
    windows
}

/// Paginates a time span over an [`ObservationSource`], one window at a time.
///
/// Windows are requested in chronological order with a pacing delay between
/// requests. A failed or empty window is logged and skipped.
pub struct WindowedFetcher<S: ObservationSource, Z: Sleeper = ThreadSleeper> {
    source: S,
    sleeper: Z,
    window_span: ChronoDuration,
    pacing: Duration,
    recent_limit: usize,
}

impl<S: ObservationSource> WindowedFetcher<S, ThreadSleeper> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            sleeper: ThreadSleeper,
            window_span: ChronoDuration::days(DEFAULT_WINDOW_DAYS),
            pacing: Duration::from_millis(DEFAULT_PACING_MILLIS),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn from_settings(source: S, settings: &ApiSettings) -> Self {
        Self::new(source)
            .with_window_span(settings.window_span())
            .with_pacing(settings.pacing())
            .with_recent_limit(settings.recent_limit)
    }
}

impl<S: ObservationSource, Z: Sleeper> WindowedFetcher<S, Z> {
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> WindowedFetcher<S, Z2> {
        WindowedFetcher {
            source: self.source,
            sleeper,
            window_span: self.window_span,
            pacing: self.pacing,
            recent_limit: self.recent_limit,
        }
    }

    pub fn with_window_span(mut self, span: ChronoDuration) -> Self {
        self.window_span = span;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every window of `[start, end)` and concatenate the results
    pub fn fetch_range(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        progress: Option<&ProgressReporter>,
    ) -> Vec<RawObservation> {
        let windows = split_windows(start, end, self.window_span);
        if let Some(p) = progress {
            p.set_length(windows.len() as u64);
        }

        let mut observations = Vec::new();
        let mut skipped = 0usize;

        for (index, (window_start, window_end)) in windows.iter().enumerate() {
            if index > 0 {
                self.sleeper.sleep(self.pacing);
            }

            match self
                .source
                .fetch_observations(station_id, *window_start, *window_end, None)
            {
                Ok(batch) if batch.is_empty() => {
                    skipped += 1;
                    warn!(
                        event_type = "window_empty",
                        station = %station_id,
                        start = %window_start,
                        end = %window_end,
                        "No observations returned"
                    );
                }
                Ok(batch) => {
                    info!(
                        event_type = "window_fetched",
                        station = %station_id,
                        start = %window_start,
                        end = %window_end,
                        count = batch.len(),
                        "Fetched observations"
                    );
                    observations.extend(batch);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(
                        event_type = "window_failed",
                        station = %station_id,
                        start = %window_start,
                        end = %window_end,
                        error = %e,
                        "Window fetch failed, skipping"
                    );
                }
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        info!(
            event_type = "range_fetched",
            station = %station_id,
            windows = windows.len(),
            skipped_windows = skipped,
            observations = observations.len(),
            "Finished windowed fetch"
        );

        observations
    }

    /// Fetch the trailing `days` days ending at `now`.
    ///
    /// `days` must lie in `1..=MAX_DAYS`; anything else is a `Config` error.
    pub fn fetch_days(
        &self,
        station_id: &str,
        days: i64,
        now: DateTime<Utc>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<RawObservation>> {
        let start = lookback_start(now, days, MAX_DAYS, ChronoDuration::try_days, "days")?;
        Ok(self.fetch_range(station_id, start, now, progress))
    }

    /// Single capped request for the last `hours`, reduced to the most recent
    /// two extracted records in time order
    pub fn fetch_recent(
        &self,
        station_id: &str,
        hours: i64,
        now: DateTime<Utc>,
        extractor: &ObservationExtractor,
    ) -> Result<Vec<CanonicalRecord>> {
        let start = lookback_start(now, hours, MAX_RECENT_HOURS, ChronoDuration::try_hours, "hours")?;

        let raw = match self
            .source
            .fetch_observations(station_id, start, now, Some(self.recent_limit))
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    event_type = "recent_failed",
                    station = %station_id,
                    error = %e,
                    "Recent observation fetch failed"
                );
                return Ok(Vec::new());
            }
        };

        let mut records = extractor.extract_all(&raw);
        records.sort_by_key(|r| r.timestamp);

        let keep_from = records.len().saturating_sub(RECENT_RECORD_COUNT);
        Ok(records.split_off(keep_from))
    }
}

fn lookback_start(
    now: DateTime<Utc>,
    amount: i64,
    max: i64,
    to_span: fn(i64) -> Option<ChronoDuration>,
    unit: &str,
) -> Result<DateTime<Utc>> {
    if !(1..=max).contains(&amount) {
        return Err(ProcessingError::Config(format!(
            "look-back must be between 1 and {} {}, got {}",
            max, unit, amount
        )));
    }

    to_span(amount)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| {
            ProcessingError::Config(format!("{} {} before {} is out of range", amount, unit, now))
        })
}
