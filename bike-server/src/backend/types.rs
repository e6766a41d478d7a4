//! The backend contract.

use futures::future::BoxFuture;

use crate::domain::{NetworkRecord, StationRecord};

use super::error::BackendError;

/// Boxed future returned by backend queries.
pub type BackendFuture<'a, T> = BoxFuture<'a, Result<T, BackendError>>;

/// A source of networks and stations for one provider.
///
/// Implementations wrap one operator's API. Each provider owns its own
/// backend instance, so implementations may keep per-instance state such as
/// an HTTP client without coordinating with other providers.
pub trait Backend: Send + Sync {
    /// Fetch all networks this backend knows about.
    fn list_networks(&self) -> BackendFuture<'_, Vec<NetworkRecord>>;

    /// Fetch the current stations of `network`.
    ///
    /// Station ids are expected to be unique within a network.
    fn list_stations<'a>(&'a self, network: &'a str) -> BackendFuture<'a, Vec<StationRecord>>;
}

/// Convert an upstream occupancy count to a non-negative value.
///
/// Missing and negative counts become zero.
pub(crate) fn occupancy(count: Option<i64>) -> u32 {
    count
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX))
        .try_into()
        .unwrap_or(0)
}
