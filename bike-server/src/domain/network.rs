//! Bike-share networks.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, Positioned};

/// A network as reported by a backend, before it is tagged with its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Longitude of the network's nominal location.
    pub x: f64,
    /// Latitude of the network's nominal location.
    pub y: f64,
}

/// A city or region scoped bike-share system operated by one provider.
///
/// Identity is `(provider_id, id)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub provider_id: String,
    pub provider_name: String,
    pub city: String,
    pub country: String,
    pub x: f64,
    pub y: f64,
}

impl Network {
    /// Tag a backend record with the provider that produced it.
    pub fn from_record(record: NetworkRecord, provider_id: &str, provider_name: &str) -> Self {
        Self {
            id: record.id,
            name: record.name,
            provider_id: provider_id.to_string(),
            provider_name: provider_name.to_string(),
            city: record.city,
            country: record.country,
            x: record.x,
            y: record.y,
        }
    }
}

impl Positioned for Network {
    fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}
