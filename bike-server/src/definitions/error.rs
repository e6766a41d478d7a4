//! Definition store error types.

use std::path::PathBuf;

/// Errors that can occur when resolving a provider definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// Provider id contains characters that cannot name a definition file
    #[error("invalid provider id: {0:?}")]
    InvalidId(String),

    /// Neither the user nor the system directory has the definition
    #[error("no definition found for provider {id:?} (searched {searched:?})")]
    NotFound { id: String, searched: Vec<PathBuf> },

    /// Definition file exists but is not a valid definition
    #[error("failed to parse definition {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Definition file exists but could not be read
    #[error("failed to read definition {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
