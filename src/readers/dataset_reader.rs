use chrono::{DateTime, FixedOffset, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::{CanonicalRecord, Schema};
use crate::processors::extractor::parse_timestamp;
use crate::utils::constants::*;

/// Loads a persisted dataset back into canonical records
pub struct DatasetReader {
    schema: Schema,
}

impl DatasetReader {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Schema implied by the header row of an existing file
    pub fn detect_schema(path: &Path) -> Result<Schema> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(File::open(path)?));
        let headers = reader.headers()?;
        Ok(Schema::detect(headers.iter()))
    }

    /// Read every row. Columns are located by header name; unparseable or
    /// missing numeric cells become `0.0` instead of failing the load.
    pub fn load(&self, path: &Path) -> Result<Vec<CanonicalRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(File::open(path)?));

        let columns = ColumnIndex::from_headers(reader.headers()?);
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;
            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            records.push(self.parse_row(&row, &columns));
        }

        debug!(
            event_type = "dataset_loaded",
            path = %path.display(),
            schema = %self.schema,
            rows = records.len(),
            "Loaded existing dataset"
        );

        Ok(records)
    }

    fn parse_row(&self, row: &StringRecord, columns: &ColumnIndex) -> CanonicalRecord {
        let timestamp = match self.schema {
            Schema::Core => None,
            Schema::Timestamped => columns
                .cell(row, COL_TIMESTAMP)
                .and_then(|cell| parse_timestamp(cell).ok())
                .or_else(|| {
                    columns
                        .cell(row, COL_UNIX_TIMESTAMP)
                        .and_then(parse_epoch_seconds)
                }),
        };

        CanonicalRecord::new(
            timestamp,
            columns.number(row, COL_TEMPERATURE),
            columns.number(row, COL_PRESSURE),
            columns.number(row, COL_HUMIDITY),
            columns.number(row, COL_WIND_SPEED),
            columns.number(row, COL_WIND_DIRECTION),
            columns.number(row, COL_PRECIPITATION),
        )
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new(Schema::Core)
    }
}

struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { positions }
    }

    fn cell<'r>(&self, row: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&i| row.get(i))
            .filter(|cell| !cell.is_empty())
    }

    fn number(&self, row: &StringRecord, column: &str) -> f64 {
        self.cell(row, column)
            .and_then(|cell| cell.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

fn parse_epoch_seconds(cell: &str) -> Option<DateTime<FixedOffset>> {
    let seconds = cell.parse::<i64>().ok()?;
    // Zero is written when the source timestamp was unusable
    if seconds == 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.fixed_offset())
}
