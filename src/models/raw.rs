use serde::Deserialize;

/// GeoJSON observation collection as returned by `/stations/{id}/observations`.
///
/// Features stay as generic JSON so that one malformed feature can be dropped
/// without discarding the rest of the window.
#[derive(Debug, Deserialize)]
pub struct ObservationCollection {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

/// Single observation feature
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub properties: RawProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperties {
    pub timestamp: Option<String>,
    pub temperature: Option<Measurement>,
    pub barometric_pressure: Option<Measurement>,
    pub relative_humidity: Option<Measurement>,
    pub wind_speed: Option<Measurement>,
    pub wind_direction: Option<Measurement>,
}

/// Quantitative value with its WMO unit code
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_code: String,
}

impl Measurement {
    pub fn new(value: Option<f64>, unit_code: &str) -> Self {
        Self {
            value,
            unit_code: unit_code.to_string(),
        }
    }
}

impl RawObservation {
    pub fn timestamp(&self) -> Option<&str> {
        self.properties.timestamp.as_deref()
    }
}
