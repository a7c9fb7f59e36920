use std::fmt;

use crate::utils::constants::*;

/// Column set used when reading or writing a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Six weather fields only, the training input layout
    Core,
    /// ISO timestamp and epoch seconds followed by the six weather fields
    Timestamped,
}

const CORE_COLUMNS: [&str; 6] = [
    COL_TEMPERATURE,
    COL_PRESSURE,
    COL_HUMIDITY,
    COL_WIND_SPEED,
    COL_WIND_DIRECTION,
    COL_PRECIPITATION,
];

const TIMESTAMPED_COLUMNS: [&str; 8] = [
    COL_TIMESTAMP,
    COL_UNIX_TIMESTAMP,
    COL_TEMPERATURE,
    COL_PRESSURE,
    COL_HUMIDITY,
    COL_WIND_SPEED,
    COL_WIND_DIRECTION,
    COL_PRECIPITATION,
];

impl Schema {
    pub fn from_include_timestamp(include_timestamp: bool) -> Self {
        if include_timestamp {
            Schema::Timestamped
        } else {
            Schema::Core
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Schema::Core => &CORE_COLUMNS,
            Schema::Timestamped => &TIMESTAMPED_COLUMNS,
        }
    }

    /// Infer the schema from a header row
    pub fn detect<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let has_time = headers
            .into_iter()
            .map(str::trim)
            .any(|h| h == COL_TIMESTAMP || h == COL_UNIX_TIMESTAMP);

        Schema::from_include_timestamp(has_time)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Schema::Core => "core",
            Schema::Timestamped => "timestamped",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order() {
        assert_eq!(
            Schema::Core.columns(),
            &[
                "temperature",
                "pressure",
                "humidity",
                "wind_speed",
                "wind_direction",
                "precipitation"
            ]
        );
        assert_eq!(Schema::Timestamped.columns()[0], "timestamp");
        assert_eq!(Schema::Timestamped.columns()[1], "unix_timestamp");
        assert_eq!(Schema::Timestamped.columns().len(), 8);
    }

    #[test]
    fn test_detect() {
        assert_eq!(Schema::detect(CORE_COLUMNS), Schema::Core);
        assert_eq!(Schema::detect(TIMESTAMPED_COLUMNS), Schema::Timestamped);
        assert_eq!(
            Schema::detect(["unix_timestamp", "temperature"]),
            Schema::Timestamped
        );
    }
}
