//! Provider cache and query configuration.

use std::time::Duration;

/// How long a network's station list stays fresh.
pub const DEFAULT_STATION_TTL: Duration = Duration::from_secs(60);

/// Buffer fractions tried when shrinking a spatial query, largest first.
pub const DEFAULT_BUFFERS: [f64; 3] = [0.2, 0.1, 0.0];

/// Maximum number of stations returned by one query.
pub const DEFAULT_MAX_STATIONS: usize = 100;

/// Deadline for a single backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by every provider in a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Station lists older than this are refreshed on the next query.
    pub station_ttl: Duration,

    /// Buffer fractions for progressive shrinking, largest first.
    /// An empty list filters by the unbuffered box only.
    pub buffers: Vec<f64>,

    /// Default cap on stations returned by a query.
    pub max_stations: usize,

    /// Deadline for backend calls. `None` relies on the backend's own timeouts.
    pub backend_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Set the station cache TTL.
    pub fn with_station_ttl(mut self, ttl: Duration) -> Self {
        self.station_ttl = ttl;
        self
    }

    /// Set the shrink buffers.
    ///
    /// Negative and non-finite values are dropped, duplicates removed and the
    /// rest ordered largest first.
    pub fn with_buffers(mut self, buffers: impl IntoIterator<Item = f64>) -> Self {
        let mut buffers: Vec<f64> = buffers
            .into_iter()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .collect();
        buffers.sort_by(|a, b| b.total_cmp(a));
        buffers.dedup();
        self.buffers = buffers;
        self
    }

    /// Set the default station cap.
    pub fn with_max_stations(mut self, max: usize) -> Self {
        self.max_stations = max;
        self
    }

    /// Set or clear the backend deadline.
    pub fn with_backend_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.backend_timeout = timeout;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            station_ttl: DEFAULT_STATION_TTL,
            buffers: DEFAULT_BUFFERS.to_vec(),
            max_stations: DEFAULT_MAX_STATIONS,
            backend_timeout: Some(DEFAULT_BACKEND_TIMEOUT),
        }
    }
}
