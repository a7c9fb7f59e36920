use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::models::CanonicalRecord;
use crate::processors::{ObservationExtractor, Resampler};
use crate::readers::{ObservationSource, Sleeper, ThreadSleeper, WindowedFetcher};
use crate::utils::ProgressReporter;

/// Sequential fetch -> extract -> resample pipeline
pub struct IngestProcessor<S: ObservationSource, Z: Sleeper = ThreadSleeper> {
    fetcher: WindowedFetcher<S, Z>,
    extractor: ObservationExtractor,
    resampler: Resampler,
}

impl<S: ObservationSource, Z: Sleeper> IngestProcessor<S, Z> {
    pub fn new(fetcher: WindowedFetcher<S, Z>) -> Self {
        Self {
            fetcher,
            extractor: ObservationExtractor::new(),
            resampler: Resampler::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: ObservationExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_resampler(mut self, resampler: Resampler) -> Self {
        self.resampler = resampler;
        self
    }

    pub fn fetcher(&self) -> &WindowedFetcher<S, Z> {
        &self.fetcher
    }

    /// Training data: windowed fetch of the trailing `days`, extracted and
    /// thinned to the resampler's minimum interval
    pub fn historical(
        &self,
        station_id: &str,
        days: i64,
        now: DateTime<Utc>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<CanonicalRecord>> {
        let raw = self.fetcher.fetch_days(station_id, days, now, progress)?;
        let extracted = self.extractor.extract_all(&raw);
        let extracted_count = extracted.len();
        let records = self.resampler.resample(extracted);

        info!(
            event_type = "historical_ready",
            station = %station_id,
            raw = raw.len(),
            extracted = extracted_count,
            resampled = records.len(),
            min_interval_hours = self.resampler.min_interval().num_hours(),
            "Prepared historical observations"
        );

        non_empty(records, station_id)
    }

    /// Smoke-test data: the two most recent observations of the last `hours`
    pub fn recent(
        &self,
        station_id: &str,
        hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CanonicalRecord>> {
        let records = self
            .fetcher
            .fetch_recent(station_id, hours, now, &self.extractor)?;

        info!(
            event_type = "recent_ready",
            station = %station_id,
            hours = hours,
            records = records.len(),
            "Prepared recent observations"
        );

        non_empty(records, station_id)
    }
}

fn non_empty(records: Vec<CanonicalRecord>, station_id: &str) -> Result<Vec<CanonicalRecord>> {
    if records.is_empty() {
        return Err(ProcessingError::NoDataRetrieved {
            station_id: station_id.to_string(),
        });
    }
    Ok(records)
}
