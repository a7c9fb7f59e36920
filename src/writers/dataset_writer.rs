use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::info;

use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalRecord, Schema};
use crate::processors::{DuplicatePolicy, IncrementalMerger, ToleranceMatch};
use crate::readers::DatasetReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file: header plus every supplied row
    Overwrite,
    /// Append only rows not already present; behaves as overwrite when the
    /// file does not exist yet
    Incremental,
}

impl WriteMode {
    pub fn from_incremental(incremental: bool) -> Self {
        if incremental {
            WriteMode::Incremental
        } else {
            WriteMode::Overwrite
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rows already in the file before this write
    pub existing_rows: usize,
    /// Rows written by this call
    pub written_rows: usize,
    /// Whether the file was (re)created with a fresh header
    pub created: bool,
}

impl WriteSummary {
    pub fn total_rows(&self) -> usize {
        self.existing_rows + self.written_rows
    }
}

#[derive(Serialize)]
struct CoreRow {
    temperature: f64,
    pressure: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    precipitation: f64,
}

#[derive(Serialize)]
struct TimestampedRow {
    timestamp: String,
    unix_timestamp: i64,
    temperature: f64,
    pressure: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    precipitation: f64,
}

impl From<&CanonicalRecord> for CoreRow {
    fn from(r: &CanonicalRecord) -> Self {
        Self {
            temperature: r.temperature,
            pressure: r.pressure,
            humidity: r.humidity,
            wind_speed: r.wind_speed,
            wind_direction: r.wind_direction,
            precipitation: r.precipitation,
        }
    }
}

impl From<&CanonicalRecord> for TimestampedRow {
    fn from(r: &CanonicalRecord) -> Self {
        Self {
            timestamp: r.iso_timestamp().unwrap_or_default(),
            unix_timestamp: r.unix_timestamp().unwrap_or(0),
            temperature: r.temperature,
            pressure: r.pressure,
            humidity: r.humidity,
            wind_speed: r.wind_speed,
            wind_direction: r.wind_direction,
            precipitation: r.precipitation,
        }
    }
}

/// Writes canonical records as CSV under a schema mode
pub struct DatasetWriter<P: DuplicatePolicy = ToleranceMatch> {
    merger: IncrementalMerger<P>,
}

impl DatasetWriter<ToleranceMatch> {
    pub fn new() -> Self {
        Self {
            merger: IncrementalMerger::new(),
        }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            merger: IncrementalMerger::with_tolerance(tolerance),
        }
    }
}

impl Default for DatasetWriter<ToleranceMatch> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DuplicatePolicy> DatasetWriter<P> {
    pub fn with_merger(merger: IncrementalMerger<P>) -> Self {
        Self { merger }
    }

    pub fn write(
        &self,
        path: &Path,
        records: &[CanonicalRecord],
        mode: WriteMode,
        schema: Schema,
    ) -> Result<WriteSummary> {
        match mode {
            WriteMode::Incremental if has_content(path) => self.append_delta(path, records, schema),
            _ => self.overwrite(path, records, schema),
        }
    }

    fn overwrite(
        &self,
        path: &Path,
        records: &[CanonicalRecord],
        schema: Schema,
    ) -> Result<WriteSummary> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer.write_record(schema.columns())?;
        write_rows(&mut writer, records, schema)?;
        writer.flush()?;

        info!(
            event_type = "dataset_written",
            path = %path.display(),
            schema = %schema,
            rows = records.len(),
            "Wrote dataset"
        );

        Ok(WriteSummary {
            existing_rows: 0,
            written_rows: records.len(),
            created: true,
        })
    }

    fn append_delta(
        &self,
        path: &Path,
        records: &[CanonicalRecord],
        schema: Schema,
    ) -> Result<WriteSummary> {
        let found = DatasetReader::detect_schema(path)?;
        if found != schema {
            return Err(ProcessingError::SchemaMismatch {
                path: path.display().to_string(),
                expected: schema.to_string(),
                found: found.to_string(),
            });
        }

        let existing = DatasetReader::new(schema).load(path)?;
        let delta = self.merger.merge(records, &existing);

        if !delta.is_empty() {
            let mut file = OpenOptions::new().read(true).append(true).open(path)?;
            if !ends_with_newline(&mut file)? {
                file.write_all(b"\n")?;
            }
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            write_rows(&mut writer, &delta, schema)?;
            writer.flush()?;
        }

        info!(
            event_type = "dataset_appended",
            path = %path.display(),
            schema = %schema,
            existing = existing.len(),
            appended = delta.len(),
            "Incremental write complete"
        );

        Ok(WriteSummary {
            existing_rows: existing.len(),
            written_rows: delta.len(),
            created: false,
        })
    }
}

fn has_content(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    records: &[CanonicalRecord],
    schema: Schema,
) -> Result<()> {
    for record in records {
        match schema {
            Schema::Core => writer.serialize(CoreRow::from(record))?,
            Schema::Timestamped => writer.serialize(TimestampedRow::from(record))?,
        }
    }
    Ok(())
}
