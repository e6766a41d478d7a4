//! Provider definition lookup.

mod error;
mod store;

pub use error::DefinitionError;
pub use store::{DefinitionStore, ProviderDefinition, ResolvedDefinition};
