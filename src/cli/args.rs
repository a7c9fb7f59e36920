use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{
    DEFAULT_DAYS, DEFAULT_OUTPUT_FILE, DEFAULT_RECENT_HOURS, DEFAULT_STATION, MAX_DAYS,
    MAX_MIN_INTERVAL_HOURS, MAX_RECENT_HOURS,
};

#[derive(Parser)]
#[command(name = "weather-ingest")]
#[command(about = "NOAA weather observation ingester for forecasting datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Configuration file [default: weather-ingest.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch observations for a station and write them as a CSV dataset
    Fetch {
        #[arg(short, long, default_value = DEFAULT_STATION, help = "Station identifier (e.g. KMSP)")]
        station: String,

        #[arg(
            short,
            long,
            default_value_t = DEFAULT_DAYS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_DAYS),
            help = "Days of history to fetch"
        )]
        days: i64,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE, help = "Output CSV file")]
        output: PathBuf,

        #[arg(long, help = "Fetch only the two latest observations")]
        recent: bool,

        #[arg(
            long,
            default_value_t = DEFAULT_RECENT_HOURS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_RECENT_HOURS),
            help = "Look-back window for --recent"
        )]
        hours: i64,

        #[arg(long, help = "Append only new observations to an existing file")]
        incremental: bool,

        #[arg(long, help = "Write timestamp and unix_timestamp columns")]
        include_timestamp: bool,

        #[arg(long, help = "Duplicate tolerance for incremental mode")]
        tolerance: Option<f64>,

        #[arg(
            long,
            value_parser = clap::value_parser!(i64).range(0..=MAX_MIN_INTERVAL_HOURS),
            help = "Minimum spacing between kept observations, in hours"
        )]
        min_interval_hours: Option<i64>,
    },

    /// Display station metadata
    Info {
        #[arg(short, long, default_value = DEFAULT_STATION)]
        station: String,
    },

    /// Summarize an existing dataset file
    Inspect {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}
