//! Backend construction by name.
//!
//! A provider definition names the backend that implements it. The loader
//! maps those names to constructors registered at start-up and builds a new,
//! independent backend instance for every provider it loads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::definitions::ResolvedDefinition;

use super::citybikes::{CityBikesBackend, CityBikesConfig};
use super::error::BackendLoadError;
use super::fixture::FixtureBackend;
use super::hsl::{HslBackend, HslConfig};
use super::types::Backend;

/// Builds a backend for a resolved provider definition.
type Constructor =
    Box<dyn Fn(&ResolvedDefinition) -> Result<Arc<dyn Backend>, BackendLoadError> + Send + Sync>;

/// Registry of backend constructors keyed by backend name.
pub struct BackendLoader {
    constructors: HashMap<String, Constructor>,
}

impl BackendLoader {
    /// Create a loader with no backends registered.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Create a loader with the built-in backends: `citybikes`, `hsl` and `fixture`.
    ///
    /// API backends honour an optional `base_url` field in the definition.
    /// The `fixture` backend requires a `fixture` field naming its data file,
    /// relative to the definition file.
    pub fn with_builtin() -> Self {
        Self::new()
            .with("citybikes", |definition| {
                let mut config = CityBikesConfig::default();
                if let Some(url) = definition.metadata_str("base_url") {
                    config = config.with_base_url(url);
                }
                Ok(Arc::new(CityBikesBackend::new(config)?))
            })
            .with("hsl", |definition| {
                let mut config = HslConfig::default();
                if let Some(url) = definition.metadata_str("base_url") {
                    config = config.with_stations_url(url);
                }
                Ok(Arc::new(HslBackend::new(config)?))
            })
            .with("fixture", |definition| {
                let file = definition
                    .metadata_str("fixture")
                    .ok_or_else(|| BackendLoadError::Init {
                        kind: "fixture".to_string(),
                        message: format!("definition {:?} has no fixture path", definition.id),
                    })?;
                let path = definition.relative_path(file);
                Ok(Arc::new(FixtureBackend::from_file(path)?))
            })
    }

    /// Register a constructor for backend `kind`, replacing any existing one.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&ResolvedDefinition) -> Result<Arc<dyn Backend>, BackendLoadError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, kind: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&ResolvedDefinition) -> Result<Arc<dyn Backend>, BackendLoadError>
            + Send
            + Sync
            + 'static,
    {
        self.register(kind, constructor);
        self
    }

    /// Registered backend names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Construct a new backend instance for `definition`.
    pub fn load(
        &self,
        definition: &ResolvedDefinition,
    ) -> Result<Arc<dyn Backend>, BackendLoadError> {
        let kind = definition.backend_kind();

        let constructor =
            self.constructors
                .get(kind)
                .ok_or_else(|| BackendLoadError::UnknownBackend {
                    provider_id: definition.id.clone(),
                    kind: kind.to_string(),
                })?;

        debug!(provider = %definition.id, backend = kind, "Loading backend");
        constructor(definition)
    }
}

impl Default for BackendLoader {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for BackendLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendLoader")
            .field("kinds", &self.kinds())
            .finish()
    }
}
