/// Observation service
pub const NOAA_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_USER_AGENT: &str =
    "weather-ingest/0.1 (https://github.com/rjl-climate/weather-ingest)";
pub const GEO_JSON_ACCEPT: &str = "application/geo+json";

/// Request pacing and windowing
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_PACING_MILLIS: u64 = 1000;
pub const DEFAULT_RECENT_LIMIT: usize = 50;
pub const RECENT_RECORD_COUNT: usize = 2;

/// Fallback measurement values (imperial units)
pub const DEFAULT_TEMPERATURE_F: f64 = 50.0;
pub const DEFAULT_PRESSURE_INHG: f64 = 30.0;
pub const DEFAULT_HUMIDITY_PCT: f64 = 60.0;
pub const DEFAULT_WIND_SPEED_MPH: f64 = 8.0;
pub const DEFAULT_WIND_DIRECTION_DEG: f64 = 180.0;

/// Upper bounds for user-supplied spans
pub const MAX_DAYS: i64 = 3650;
pub const MAX_RECENT_HOURS: i64 = 8760;
pub const MAX_MIN_INTERVAL_HOURS: i64 = 8760;
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Resampling and merge defaults
pub const DEFAULT_MIN_INTERVAL_HOURS: i64 = 1;
pub const DEFAULT_DEDUP_TOLERANCE: f64 = 0.1;

/// Rounding precision
pub const CONTINUOUS_DECIMALS: i32 = 2;
pub const DIRECTION_DECIMALS: i32 = 0;

/// CLI defaults
pub const DEFAULT_STATION: &str = "KMSP";
pub const DEFAULT_DAYS: i64 = 30;
pub const DEFAULT_RECENT_HOURS: i64 = 48;
pub const DEFAULT_OUTPUT_FILE: &str = "data/historical_data.csv";
pub const DEFAULT_CONFIG_FILE: &str = "weather-ingest.toml";
pub const ENV_PREFIX: &str = "WEATHER_INGEST";

/// Dataset column names
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_UNIX_TIMESTAMP: &str = "unix_timestamp";
pub const COL_TEMPERATURE: &str = "temperature";
pub const COL_PRESSURE: &str = "pressure";
pub const COL_HUMIDITY: &str = "humidity";
pub const COL_WIND_SPEED: &str = "wind_speed";
pub const COL_WIND_DIRECTION: &str = "wind_direction";
pub const COL_PRECIPITATION: &str = "precipitation";
