//! Domain types for bike-share networks and stations.
//!
//! Backends produce plain records; the provider layer turns them into
//! [`Network`] and [`Station`] values, tagging networks with their provider
//! and deriving each station's stable ordering key.

mod bbox;
mod network;
mod station;

pub use bbox::BoundingBox;
pub use network::{Network, NetworkRecord};
pub use station::{Station, StationKey, StationRecord};
