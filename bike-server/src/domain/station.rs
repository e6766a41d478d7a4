//! Bike-share stations and their ordering keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::geo::{Coordinate, Positioned};

/// Stable ordering key for a station.
///
/// Derived solely from the provider-assigned station id, so the same
/// station keeps the same key across refreshes no matter what order the
/// backend returns stations in.
///
/// # Examples
///
/// ```
/// use bike_server::domain::StationKey;
///
/// let a = StationKey::from_id("042");
/// let b = StationKey::from_id("042");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// assert_ne!(a, StationKey::from_id("043"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StationKey(String);

impl StationKey {
    /// Hash a station id into its key (lowercase hex SHA-256).
    pub fn from_id(id: &str) -> Self {
        let digest = Sha256::digest(id.as_bytes());
        Self(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationKey({})", &self.0[..12.min(self.0.len())])
    }
}

/// A station as reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub free_bikes: u32,
    pub empty_slots: u32,
    #[serde(default)]
    pub name: Option<String>,
}

/// A physical bike-share dock with live occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub key: StationKey,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    pub free_bikes: u32,
    pub empty_slots: u32,
    pub name: Option<String>,
}

impl Station {
    /// Ingest a backend record, deriving its key.
    pub fn from_record(record: StationRecord) -> Self {
        Self {
            key: StationKey::from_id(&record.id),
            id: record.id,
            x: record.x,
            y: record.y,
            free_bikes: record.free_bikes,
            empty_slots: record.empty_slots,
            name: record.name,
        }
    }
}

impl Positioned for Station {
    fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> StationRecord {
        StationRecord {
            id: id.to_string(),
            x: 24.94,
            y: 60.17,
            free_bikes: 3,
            empty_slots: 9,
            name: Some("Kaivopuisto".to_string()),
        }
    }

    #[test]
    fn key_is_hex_sha256_of_id() {
        // sha256("abc")
        assert_eq!(
            StationKey::from_id("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn key_survives_refresh() {
        let first = Station::from_record(record("001"));

        let mut updated = record("001");
        updated.free_bikes = 0;
        updated.x = 24.95;
        let second = Station::from_record(updated);

        assert_eq!(first.key, second.key);
    }

    #[test]
    fn from_record_keeps_fields() {
        let station = Station::from_record(record("001"));
        assert_eq!(station.id, "001");
        assert_eq!(station.free_bikes, 3);
        assert_eq!(station.empty_slots, 9);
        assert_eq!(station.name.as_deref(), Some("Kaivopuisto"));
        assert_eq!(station.position(), Coordinate::new(24.94, 60.17));
    }

    #[test]
    fn record_name_is_optional() {
        let json = r#"{"id": "7", "x": 1.0, "y": 2.0, "free_bikes": 0, "empty_slots": 4}"#;
        let record: StationRecord = serde_json::from_str(json).unwrap();
        assert!(record.name.is_none());
    }

    #[test]
    fn negative_occupancy_is_rejected() {
        let json = r#"{"id": "7", "x": 1.0, "y": 2.0, "free_bikes": -1, "empty_slots": 4}"#;
        assert!(serde_json::from_str::<StationRecord>(json).is_err());
    }
}
