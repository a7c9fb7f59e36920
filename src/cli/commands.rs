use chrono::Utc;
use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::cli::args::{Cli, Commands};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::models::{CanonicalRecord, Schema};
use crate::processors::{IngestProcessor, ObservationExtractor, Resampler};
use crate::readers::{DatasetReader, NoaaClient, WindowedFetcher};
use crate::utils::progress::ProgressReporter;
use crate::utils::{init_logging, recent_output_path};
use crate::writers::{DatasetWriter, WriteMode};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    // Bars would interleave with debug output
    let quiet = cli.verbose;
    let mut config = IngestConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            station,
            days,
            output,
            recent,
            hours,
            incremental,
            include_timestamp,
            tolerance,
            min_interval_hours,
        } => {
            if let Some(t) = tolerance {
                config.tolerance = t;
            }
            if let Some(h) = min_interval_hours {
                config.min_interval_hours = h;
            }
            config.validate()?;

            let schema = Schema::from_include_timestamp(include_timestamp);
            let mode = WriteMode::from_incremental(incremental);
            let output_file = if recent {
                recent_output_path(&output)
            } else {
                output
            };

            if let Some(parent) = output_file.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let client = NoaaClient::new(&config.api)?;
            let fetcher = WindowedFetcher::from_settings(client, &config.api);
            let processor = IngestProcessor::new(fetcher)
                .with_extractor(ObservationExtractor::with_defaults(config.fallback.clone()))
                .with_resampler(Resampler::new(config.min_interval()));

            let now = Utc::now();
            let records = if recent {
                println!(
                    "Fetching recent weather data for {} (last {} hours)...",
                    station, hours
                );
                let spinner = ProgressReporter::new_spinner("Requesting latest observations...", quiet);
                let fetched = processor.recent(&station, hours, now);
                spinner.finish_with_message("Fetch complete");
                fetched?
            } else {
                println!(
                    "Fetching weather data for {} (last {} days)...",
                    station, days
                );
                let progress = ProgressReporter::new(0, "Fetching windows...", quiet);
                let fetched = processor.historical(&station, days, now, Some(&progress));
                progress.finish_with_message("Fetch complete");
                fetched?
            };

            let writer = DatasetWriter::with_tolerance(config.tolerance);
            let summary = writer.write(&output_file, &records, mode, schema)?;

            info!(
                event_type = "ingest_complete",
                station = %station,
                output = %output_file.display(),
                written = summary.written_rows,
                total = summary.total_rows(),
                "Ingestion finished"
            );

            println!("\nSaved {} observations to {}", summary.written_rows, output_file.display());
            if mode == WriteMode::Incremental && !summary.created {
                println!(
                    "Incremental update: {} existing + {} new = {} rows",
                    summary.existing_rows,
                    summary.written_rows,
                    summary.total_rows()
                );
            }
            println!("Schema: {}", schema);

            if let Some(first) = records.first() {
                println!("\nFirst observation:");
                println!("{}", describe(first));
            }
        }

        Commands::Info { station } => {
            let client = NoaaClient::new(&config.api)?;
            let station_info = client.fetch_station_info(&station)?;
            println!("{}", station_info.summary(&station));
        }

        Commands::Inspect { file, sample } => {
            inspect(&file, sample)?;
        }
    }

    Ok(())
}

fn inspect(file: &Path, sample: usize) -> Result<()> {
    println!("Inspecting dataset: {}", file.display());

    let schema = DatasetReader::detect_schema(file)?;
    let records = DatasetReader::new(schema).load(file)?;
    let out_of_range = records.iter().filter(|r| r.validate().is_err()).count();

    println!("Schema: {}", schema);
    println!("Rows: {}", records.len());
    println!("Out-of-range rows: {}", out_of_range);

    if schema == Schema::Timestamped {
        let mut times = records.iter().filter_map(|r| r.timestamp);
        if let Some(first) = times.next() {
            let last = times.last().unwrap_or(first);
            println!("Time span: {} to {}", first.to_rfc3339(), last.to_rfc3339());
        }
    }

    if sample > 0 && !records.is_empty() {
        println!("\nSample Records (showing {} records):", sample.min(records.len()));
        for (i, record) in records.iter().take(sample).enumerate() {
            println!("{}. {}", i + 1, describe(record));
        }
    }

    Ok(())
}

fn describe(record: &CanonicalRecord) -> String {
    let when = record
        .iso_timestamp()
        .map(|ts| format!("{}: ", ts))
        .unwrap_or_default();
    format!(
        "{}{:.2}°F, {:.2} inHg, {:.2}% RH, wind {:.2} mph from {:.0}°, precip {:.2} in",
        when,
        record.temperature,
        record.pressure,
        record.humidity,
        record.wind_speed,
        record.wind_direction,
        record.precipitation
    )
}
