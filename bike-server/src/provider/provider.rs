//! The provider: one backend plus its caches.
//!
//! A provider caches its network list for the lifetime of the process and
//! each network's station list for a configurable TTL. Station lists are
//! stored as immutable snapshots and replaced wholesale on refresh, so
//! readers never observe a partially updated list. Each network has its own
//! refresh gate: callers that queue behind a refresh read whatever it left
//! in the cache instead of calling the backend again, whether it succeeded
//! or not. Refreshes of different networks do not wait for each other.
//!
//! Query operations never fail. Backend errors are logged and the query
//! falls back to the last good snapshot, or to an empty result.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, BackendError, BackendLoader};
use crate::definitions::{DefinitionStore, ResolvedDefinition};
use crate::domain::{BoundingBox, Network, Station};
use crate::geo::{Coordinate, sort_by_distance};

use super::config::ProviderConfig;
use super::error::ProviderError;
use super::select::{center, count_within, select_stations};

/// A network's station list as last fetched.
#[derive(Debug, Clone)]
struct StationSnapshot {
    stations: Arc<[Station]>,
    fetched_at: Instant,
}

/// Serialises refreshes of one network.
///
/// `attempts` counts finished refreshes, successful or not. A caller that
/// waited on `gate` while the count moved reads whatever that refresh left
/// in the cache instead of calling the backend again.
#[derive(Debug, Default)]
struct RefreshSlot {
    gate: Mutex<()>,
    attempts: AtomicU64,
}

/// Counters for monitoring a provider.
#[derive(Debug, Default)]
struct Counters {
    backend_calls: AtomicU64,
    backend_failures: AtomicU64,
    cache_hits: AtomicU64,
}

/// Point-in-time copy of a provider's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    /// Calls made to the backend.
    pub backend_calls: u64,
    /// Backend calls that failed or timed out.
    pub backend_failures: u64,
    /// Queries answered from cache without calling the backend.
    pub cache_hits: u64,
}

/// A named data source exposing bike networks and stations.
pub struct Provider {
    id: String,
    name: String,
    definition_path: PathBuf,
    backend: Arc<dyn Backend>,
    config: ProviderConfig,

    /// Network list; fetched once, retried while empty.
    networks: Mutex<Vec<Network>>,

    /// Station snapshots keyed by network id.
    stations: RwLock<HashMap<String, StationSnapshot>>,

    /// Per-network refresh gates, created on first use.
    refreshes: Mutex<HashMap<String, Arc<RefreshSlot>>>,

    counters: Counters,
}

impl Provider {
    /// Create a provider around an already loaded backend.
    pub fn new(
        definition: ResolvedDefinition,
        backend: Arc<dyn Backend>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            name: definition.definition.name,
            id: definition.id,
            definition_path: definition.path,
            backend,
            config,
            networks: Mutex::new(Vec::new()),
            stations: RwLock::new(HashMap::new()),
            refreshes: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Resolve `id`'s definition, load its backend and create the provider.
    ///
    /// Definition and backend failures are returned to the caller.
    pub fn open(
        id: &str,
        store: &DefinitionStore,
        loader: &BackendLoader,
        config: ProviderConfig,
    ) -> Result<Self, ProviderError> {
        let definition = store.resolve(id)?;
        let backend = loader.load(&definition)?;

        info!(
            provider = %definition.id,
            name = %definition.name(),
            backend = %definition.backend_kind(),
            "Provider loaded"
        );

        Ok(Self::new(definition, backend, config))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the definition file this provider was created from.
    pub fn definition_path(&self) -> &Path {
        &self.definition_path
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Snapshot of the provider's counters.
    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            backend_calls: self.counters.backend_calls.load(Ordering::Relaxed),
            backend_failures: self.counters.backend_failures.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Return this provider's networks, nearest first if `origin` is given.
    ///
    /// Ties in distance keep the backend's order. Returns an empty list if
    /// the backend fails.
    pub async fn get_networks(&self, origin: Option<Coordinate>) -> Vec<Network> {
        let networks = {
            let mut cache = self.networks.lock().await;

            if cache.is_empty() {
                match self.call_backend(self.backend.list_networks()).await {
                    Ok(records) => {
                        *cache = records
                            .into_iter()
                            .map(|r| Network::from_record(r, &self.id, &self.name))
                            .collect();
                        debug!(provider = %self.id, count = cache.len(), "Fetched networks");
                    }
                    Err(e) => {
                        self.record_failure(None, &e);
                        return Vec::new();
                    }
                }
            } else {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            }

            cache.clone()
        };

        match origin {
            Some(origin) => sort_by_distance(networks, origin),
            None => networks,
        }
    }

    /// Return at most `max_count` stations of `network` in `bbox`.
    ///
    /// `bbox` defaults to the whole world. The station list is refreshed from
    /// the backend when it is missing, empty or older than the TTL. See
    /// [`select_stations`] for how the result is bounded.
    pub async fn list_stations(
        &self,
        network: &str,
        bbox: Option<BoundingBox>,
        max_count: usize,
    ) -> Vec<Station> {
        let Some(stations) = self.station_snapshot(network).await else {
            return Vec::new();
        };

        let bbox = bbox.unwrap_or(BoundingBox::WORLD);
        select_stations(&stations, &bbox, &self.config.buffers, max_count)
    }

    /// Mean position of the cached stations of `network`.
    ///
    /// Reads whatever is cached and never calls the backend.
    pub async fn get_center(&self, network: &str) -> Option<Coordinate> {
        let stations = self.stations.read().await;
        stations.get(network).and_then(|s| center(&s.stations))
    }

    /// Number of cached stations of `network` inside `bbox` (no buffer, no cap).
    ///
    /// Reads whatever is cached and never calls the backend.
    pub async fn get_total_stations(&self, network: &str, bbox: Option<BoundingBox>) -> usize {
        let bbox = bbox.unwrap_or(BoundingBox::WORLD);
        let stations = self.stations.read().await;
        stations
            .get(network)
            .map_or(0, |s| count_within(&s.stations, &bbox))
    }

    /// Current station snapshot for `network`, refreshing it if stale.
    async fn station_snapshot(&self, network: &str) -> Option<Arc<[Station]>> {
        let slot = self.refresh_slot(network).await;
        let seen = slot.attempts.load(Ordering::Acquire);

        if let Some(fresh) = self.fresh_stations(network).await {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(fresh);
        }

        let _gate = slot.gate.lock().await;

        // A refresh finished while we waited; take its outcome.
        if slot.attempts.load(Ordering::Acquire) != seen {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return self.cached_stations(network).await;
        }

        let result = self.refresh_stations(network).await;
        slot.attempts.fetch_add(1, Ordering::Release);
        result
    }

    /// Gate and attempt counter for `network`.
    async fn refresh_slot(&self, network: &str) -> Arc<RefreshSlot> {
        let mut slots = self.refreshes.lock().await;
        Arc::clone(slots.entry(network.to_string()).or_default())
    }

    /// Fetch `network` from the backend, falling back to the stale snapshot.
    ///
    /// Callers must hold the network's refresh gate.
    async fn refresh_stations(&self, network: &str) -> Option<Arc<[Station]>> {
        match self.call_backend(self.backend.list_stations(network)).await {
            Ok(records) => {
                let stations: Arc<[Station]> =
                    records.into_iter().map(Station::from_record).collect();
                debug!(
                    provider = %self.id,
                    network,
                    count = stations.len(),
                    "Refreshed stations"
                );

                let snapshot = StationSnapshot {
                    stations: Arc::clone(&stations),
                    fetched_at: Instant::now(),
                };
                self.stations
                    .write()
                    .await
                    .insert(network.to_string(), snapshot);

                Some(stations)
            }
            Err(e) => {
                self.record_failure(Some(network), &e);

                let stale = self.cached_stations(network).await;
                if let Some(stale) = &stale {
                    warn!(
                        provider = %self.id,
                        network,
                        count = stale.len(),
                        "Serving stale stations"
                    );
                }
                stale
            }
        }
    }

    /// Cached stations of `network` regardless of age.
    async fn cached_stations(&self, network: &str) -> Option<Arc<[Station]>> {
        let stations = self.stations.read().await;
        stations.get(network).map(|s| Arc::clone(&s.stations))
    }

    /// Cached stations of `network` if present, non-empty and within the TTL.
    async fn fresh_stations(&self, network: &str) -> Option<Arc<[Station]>> {
        let stations = self.stations.read().await;
        let snapshot = stations.get(network)?;

        let fresh = !snapshot.stations.is_empty()
            && snapshot.fetched_at.elapsed() <= self.config.station_ttl;
        fresh.then(|| Arc::clone(&snapshot.stations))
    }

    /// Run a backend call under the configured deadline.
    async fn call_backend<T>(
        &self,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        self.counters.backend_calls.fetch_add(1, Ordering::Relaxed);

        match self.config.backend_timeout {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| BackendError::Timeout(deadline))?,
            None => call.await,
        }
    }

    fn record_failure(&self, network: Option<&str>, err: &BackendError) {
        self.counters.backend_failures.fetch_add(1, Ordering::Relaxed);

        if err.is_timeout() {
            warn!(provider = %self.id, network, error = %err, "Backend call timed out");
        } else {
            error!(provider = %self.id, network, error = ?err, "Backend call failed");
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("definition_path", &self.definition_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
