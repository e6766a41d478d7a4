//! Providers: cached, spatially queryable views over backends.
//!
//! A [`Provider`] wraps one backend and caches what it returns. Providers
//! are obtained through a [`ProviderRegistry`], which resolves definitions,
//! loads backends and keeps one provider per id for the life of the process.

mod config;
mod error;
#[allow(clippy::module_inception)]
mod provider;
mod registry;
mod select;


pub use config::{
    DEFAULT_BACKEND_TIMEOUT, DEFAULT_BUFFERS, DEFAULT_MAX_STATIONS, DEFAULT_STATION_TTL,
    ProviderConfig,
};
pub use error::ProviderError;
pub use provider::{Provider, ProviderStats};
pub use registry::ProviderRegistry;
pub use select::{center, count_within, select_stations};
