//! Application state for the web layer.

use crate::app::Application;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Providers and cross-provider operations
    pub app: Application,
}

impl AppState {
    /// Create a new app state.
    pub fn new(app: Application) -> Self {
        Self { app }
    }
}
