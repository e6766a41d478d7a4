//! Global bike-share networks via the CityBikes API.
//!
//! <https://api.citybik.es/v2/>

use reqwest::Url;
use serde::Deserialize;

use crate::domain::{NetworkRecord, StationRecord};

use super::error::{BackendError, BackendLoadError};
use super::http::{get_text, json_client, parse_json};
use super::types::{Backend, BackendFuture, occupancy};

/// Default base URL for the CityBikes API.
const DEFAULT_BASE_URL: &str = "https://api.citybik.es";

#[derive(Debug, Deserialize)]
struct NetworksResponse {
    networks: Vec<NetworkDto>,
}

#[derive(Debug, Deserialize)]
struct NetworkDto {
    id: String,
    name: String,
    location: LocationDto,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct StationsResponse {
    network: StationsNetworkDto,
}

#[derive(Debug, Deserialize)]
struct StationsNetworkDto {
    stations: Vec<StationDto>,
}

#[derive(Debug, Deserialize)]
struct StationDto {
    id: String,
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    free_bikes: Option<i64>,
    empty_slots: Option<i64>,
}

/// Configuration for the CityBikes backend.
#[derive(Debug, Clone)]
pub struct CityBikesConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CityBikesConfig {
    /// Set a custom base URL (for testing or a mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for CityBikesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Backend for the CityBikes API.
#[derive(Debug, Clone)]
pub struct CityBikesBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl CityBikesBackend {
    pub fn new(config: CityBikesConfig) -> Result<Self, BackendLoadError> {
        let init_error = |message: String| BackendLoadError::Init {
            kind: "citybikes".to_string(),
            message,
        };

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| init_error(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(init_error(format!("base URL {:?} cannot have a path", config.base_url)));
        }

        Ok(Self {
            http: json_client(config.timeout_secs)?,
            base_url,
        })
    }

    /// `<base>/v2/networks[/<network>]?<query>`, with the network id
    /// percent-encoded as a single path segment.
    fn networks_url(&self, network: Option<&str>, query: &str) -> Result<Url, BackendError> {
        if let Some(network @ ("" | "." | "..")) = network {
            return Err(BackendError::Unavailable(format!("invalid network id {network:?}")));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Unavailable("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["v2", "networks"])
            .extend(network);
        url.set_query(Some(query));
        Ok(url)
    }

    async fn fetch_networks(&self) -> Result<Vec<NetworkRecord>, BackendError> {
        let url = self.networks_url(None, "fields=id,location,name")?;
        let body = get_text(&self.http, url.as_str()).await?;
        parse_networks(&body)
    }

    async fn fetch_stations(&self, network: &str) -> Result<Vec<StationRecord>, BackendError> {
        let url = self.networks_url(Some(network), "fields=stations")?;
        let body = get_text(&self.http, url.as_str()).await?;
        parse_stations(&body)
    }
}

impl Backend for CityBikesBackend {
    fn list_networks(&self) -> BackendFuture<'_, Vec<NetworkRecord>> {
        Box::pin(self.fetch_networks())
    }

    fn list_stations<'a>(&'a self, network: &'a str) -> BackendFuture<'a, Vec<StationRecord>> {
        Box::pin(self.fetch_stations(network))
    }
}

fn parse_networks(body: &str) -> Result<Vec<NetworkRecord>, BackendError> {
    let response: NetworksResponse = parse_json(body)?;

    Ok(response
        .networks
        .into_iter()
        .map(|n| NetworkRecord {
            id: n.id,
            name: n.name,
            city: n.location.city,
            country: n.location.country,
            x: n.location.longitude,
            y: n.location.latitude,
        })
        .collect())
}

fn parse_stations(body: &str) -> Result<Vec<StationRecord>, BackendError> {
    let response: StationsResponse = parse_json(body)?;

    Ok(response
        .network
        .stations
        .into_iter()
        .map(|s| StationRecord {
            id: s.id,
            x: s.longitude,
            y: s.latitude,
            free_bikes: occupancy(s.free_bikes),
            empty_slots: occupancy(s.empty_slots),
            name: s.name,
        })
        .collect())
}
