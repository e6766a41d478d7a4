//! File-backed backend for offline development and testing.
//!
//! Serves networks and stations from a JSON file of the form:
//!
//! ```json
//! {
//!   "networks": [{"id": "demo", "name": "Demo", "city": "Demo", "country": "XX", "x": 0.0, "y": 0.0}],
//!   "stations": {"demo": [{"id": "1", "x": 0.1, "y": 0.1, "free_bikes": 2, "empty_slots": 8}]}
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{NetworkRecord, StationRecord};

use super::error::{BackendError, BackendLoadError};
use super::types::{Backend, BackendFuture};

#[derive(Debug, Deserialize)]
struct FixtureData {
    networks: Vec<NetworkRecord>,
    #[serde(default)]
    stations: HashMap<String, Vec<StationRecord>>,
}

/// Backend serving static data loaded once at construction.
#[derive(Debug, Clone, Default)]
pub struct FixtureBackend {
    networks: Vec<NetworkRecord>,
    stations: HashMap<String, Vec<StationRecord>>,
}

impl FixtureBackend {
    /// Create a backend from in-memory data.
    pub fn from_data(
        networks: Vec<NetworkRecord>,
        stations: HashMap<String, Vec<StationRecord>>,
    ) -> Self {
        Self { networks, stations }
    }

    /// Load a backend from a JSON fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BackendLoadError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|e| BackendLoadError::Init {
            kind: "fixture".to_string(),
            message: format!("failed to read {}: {}", path.display(), e),
        })?;

        let data: FixtureData = serde_json::from_str(&json).map_err(|e| BackendLoadError::Init {
            kind: "fixture".to_string(),
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;

        Ok(Self::from_data(data.networks, data.stations))
    }
}

impl Backend for FixtureBackend {
    fn list_networks(&self) -> BackendFuture<'_, Vec<NetworkRecord>> {
        let networks = self.networks.clone();
        Box::pin(async move { Ok::<_, BackendError>(networks) })
    }

    fn list_stations<'a>(&'a self, network: &'a str) -> BackendFuture<'a, Vec<StationRecord>> {
        let result = self.stations.get(network).cloned().ok_or_else(|| {
            BackendError::Unavailable(format!("no fixture stations for {network:?}"))
        });
        Box::pin(async move { result })
    }
}
