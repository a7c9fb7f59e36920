use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Observation service returned {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("JSON payload error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Dataset {path} uses the {found} schema, refusing to append {expected} rows")]
    SchemaMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("No weather data retrieved for station {station_id}")]
    NoDataRetrieved { station_id: String },

    #[error("Missing required data: {0}")]
    MissingData(String),
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
