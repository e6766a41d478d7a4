//! Web layer for the bike-share server.
//!
//! Exposes providers, networks and station queries as a JSON API.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
