use serde::Deserialize;

use crate::models::raw::Measurement;

/// Station metadata from `/stations/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct StationInfo {
    #[serde(default)]
    pub properties: StationProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    pub name: Option<String>,
    pub state: Option<String>,
    pub time_zone: Option<String>,
    pub elevation: Option<Measurement>,
}

impl StationInfo {
    /// Human-readable summary used by the `info` command
    pub fn summary(&self, station_id: &str) -> String {
        let props = &self.properties;
        let mut lines = vec![
            format!("Station ID: {}", station_id),
            format!("Name: {}", props.name.as_deref().unwrap_or("Unknown")),
            format!("State: {}", props.state.as_deref().unwrap_or("Unknown")),
            format!(
                "Time Zone: {}",
                props.time_zone.as_deref().unwrap_or("Unknown")
            ),
        ];

        if let Some(elevation) = &props.elevation {
            let value = elevation
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            lines.push(format!("Elevation: {} {}", value, elevation.unit_code));
        }

        lines.join("\n")
    }
}
