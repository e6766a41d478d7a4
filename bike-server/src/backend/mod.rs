//! Pluggable data sources for providers.
//!
//! A backend knows how to fetch one operator's networks and stations. The
//! provider layer never talks to an operator API directly; it goes through
//! the [`Backend`] trait, so backends can be swapped for fixtures in tests
//! and development.

mod citybikes;
mod error;
mod fixture;
mod hsl;
mod http;
mod loader;
mod types;

pub use citybikes::{CityBikesBackend, CityBikesConfig};
pub use error::{BackendError, BackendLoadError};
pub use fixture::FixtureBackend;
pub use hsl::{HslBackend, HslConfig};
pub use loader::BackendLoader;
pub use types::{Backend, BackendFuture};
