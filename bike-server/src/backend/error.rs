//! Backend error types.

use std::time::Duration;

/// Errors from a backend query.
///
/// The provider layer treats all of these the same way: the failure is
/// logged and the query falls back to cached or empty data.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed (connection error, client-side timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The call did not finish within the provider's deadline
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Backend has no data for the request
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Whether this failure is a deadline expiry rather than a fault.
    pub fn is_timeout(&self) -> bool {
        match self {
            BackendError::Timeout(_) => true,
            BackendError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Errors from constructing a backend for a provider.
#[derive(Debug, thiserror::Error)]
pub enum BackendLoadError {
    /// No backend implementation is registered under this name
    #[error("no backend {kind:?} for provider {provider_id:?}")]
    UnknownBackend { provider_id: String, kind: String },

    /// The backend could not be initialised
    #[error("failed to initialise backend {kind:?}: {message}")]
    Init { kind: String, message: String },

    /// The backend's HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
