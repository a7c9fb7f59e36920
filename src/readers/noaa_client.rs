//! NWS / NOAA observation API client.
//!
//! API documentation: https://www.weather.gov/documentation/services-web-api
//! Observations: `GET /stations/{stationId}/observations?start=..&end=..&limit=..`

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::error::{ProcessingError, Result};
use crate::models::{ObservationCollection, RawObservation, StationInfo};
use crate::utils::constants::GEO_JSON_ACCEPT;

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Anything that can return raw observations for a bounded time range
pub trait ObservationSource {
    fn fetch_observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<RawObservation>>;
}

pub struct NoaaClient {
    client: Client,
    base_url: String,
}

impl NoaaClient {
    /// Build a client with the configured timeout and client identifier
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON_ACCEPT));

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn station_url(&self, station_id: &str) -> String {
        format!("{}/stations/{}", self.base_url, station_id)
    }

    fn get_text(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<String> {
        let response = request.send()?;

        if !response.status().is_success() {
            return Err(ProcessingError::UpstreamStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }

    /// Station metadata (name, state, time zone, elevation)
    pub fn fetch_station_info(&self, station_id: &str) -> Result<StationInfo> {
        let url = self.station_url(station_id);
        debug!(event_type = "station_request", station = %station_id, url = %url);

        let body = self.get_text(self.client.get(&url), &url)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl ObservationSource for NoaaClient {
    fn fetch_observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<RawObservation>> {
        let url = format!("{}/observations", self.station_url(station_id));

        let mut request = self.client.get(&url).query(&[
            ("start", start.format(QUERY_TIME_FORMAT).to_string()),
            ("end", end.format(QUERY_TIME_FORMAT).to_string()),
        ]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        debug!(
            event_type = "observation_request",
            station = %station_id,
            start = %start,
            end = %end,
            limit = ?limit,
            "Requesting observations"
        );

        let body = self.get_text(request, &url)?;
        parse_observations(&body)
    }
}

/// Decode an observation collection, dropping features that fail to decode.
///
/// A body that is not a JSON object with a `features` array is an error.
pub fn parse_observations(body: &str) -> Result<Vec<RawObservation>> {
    let collection: ObservationCollection = serde_json::from_str(body)?;
    let total = collection.features.len();

    let observations: Vec<RawObservation> = collection
        .features
        .into_iter()
        .filter_map(|feature| match serde_json::from_value::<RawObservation>(feature) {
            Ok(obs) => Some(obs),
            Err(e) => {
                warn!(
                    event_type = "feature_dropped",
                    error = %e,
                    "Malformed observation feature"
                );
                None
            }
        })
        .collect();

    if observations.len() < total {
        debug!(
            event_type = "features_decoded",
            total = total,
            decoded = observations.len()
        );
    }

    Ok(observations)
}
