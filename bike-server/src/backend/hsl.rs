//! City bikes in the Helsinki region via Digitransit.
//!
//! <https://digitransit.fi/en/developers/>

use serde::Deserialize;

use crate::domain::{NetworkRecord, StationRecord};

use super::error::{BackendError, BackendLoadError};
use super::http::{get_text, json_client, parse_json};
use super::types::{Backend, BackendFuture, occupancy};

/// Default bike rental endpoint.
const DEFAULT_STATIONS_URL: &str = "https://api.digitransit.fi/routing/v1/routers/hsl/bike_rental";

/// Id of the single network this backend serves.
const NETWORK_ID: &str = "hsl";

#[derive(Debug, Deserialize)]
struct BikeRentalResponse {
    stations: Vec<BikeRentalStation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BikeRentalStation {
    id: String,
    name: Option<String>,
    x: f64,
    y: f64,
    bikes_available: Option<i64>,
    spaces_available: Option<i64>,
}

/// Configuration for the HSL backend.
#[derive(Debug, Clone)]
pub struct HslConfig {
    /// Bike rental endpoint
    pub stations_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HslConfig {
    /// Set a custom endpoint (for testing).
    pub fn with_stations_url(mut self, url: impl Into<String>) -> Self {
        self.stations_url = url.into();
        self
    }
}

impl Default for HslConfig {
    fn default() -> Self {
        Self {
            stations_url: DEFAULT_STATIONS_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Backend for Helsinki region city bikes.
#[derive(Debug, Clone)]
pub struct HslBackend {
    http: reqwest::Client,
    stations_url: String,
}

impl HslBackend {
    pub fn new(config: HslConfig) -> Result<Self, BackendLoadError> {
        Ok(Self {
            http: json_client(config.timeout_secs)?,
            stations_url: config.stations_url,
        })
    }

    async fn fetch_stations(&self, network: &str) -> Result<Vec<StationRecord>, BackendError> {
        if network != NETWORK_ID {
            return Err(BackendError::Unavailable(format!("unknown network {network:?}")));
        }

        let body = get_text(&self.http, &self.stations_url).await?;
        parse_stations(&body)
    }
}

impl Backend for HslBackend {
    fn list_networks(&self) -> BackendFuture<'_, Vec<NetworkRecord>> {
        Box::pin(async { Ok::<_, BackendError>(vec![helsinki()]) })
    }

    fn list_stations<'a>(&'a self, network: &'a str) -> BackendFuture<'a, Vec<StationRecord>> {
        Box::pin(self.fetch_stations(network))
    }
}

fn helsinki() -> NetworkRecord {
    NetworkRecord {
        id: NETWORK_ID.to_string(),
        name: "HSL".to_string(),
        city: "Helsinki".to_string(),
        country: "FI".to_string(),
        x: 24.941,
        y: 60.169,
    }
}

fn parse_stations(body: &str) -> Result<Vec<StationRecord>, BackendError> {
    let response: BikeRentalResponse = parse_json(body)?;

    Ok(response
        .stations
        .into_iter()
        .map(|s| StationRecord {
            id: s.id,
            x: s.x,
            y: s.y,
            free_bikes: occupancy(s.bikes_available),
            empty_slots: occupancy(s.spaces_available),
            name: s.name,
        })
        .collect())
}
