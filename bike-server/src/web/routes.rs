//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::provider::{Provider, ProviderError, ProviderStats};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/providers", get(list_providers))
        .route("/provider", get(resolve_provider))
        .route("/networks", get(list_all_networks))
        .route("/providers/:id/networks", get(provider_networks))
        .route("/providers/:id/stats", get(provider_stats))
        .route("/providers/:id/networks/:network/stations", get(stations))
        .route("/providers/:id/networks/:network/center", get(network_center))
        .route("/providers/:id/networks/:network/total", get(network_total))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List configured providers.
async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = state
        .app
        .list_providers()
        .into_iter()
        .map(ProviderInfo::from_definition)
        .collect();

    Json(ProvidersResponse {
        providers,
        default: state.app.default_provider().to_string(),
    })
}

/// The provider serving `id`, falling back to the default provider.
async fn resolve_provider(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> Result<Json<ResolvedProviderResponse>, AppError> {
    let requested = query
        .id
        .unwrap_or_else(|| state.app.default_provider().to_string());
    let provider = state.app.provider_or_default(&requested).await?;

    Ok(Json(ResolvedProviderResponse {
        fallback: provider.id() != requested,
        id: provider.id().to_string(),
        name: provider.name().to_string(),
        requested,
    }))
}

/// Networks of every provider.
async fn list_all_networks(
    State(state): State<AppState>,
    Query(query): Query<OriginQuery>,
) -> Json<NetworksResponse> {
    let networks = state.app.list_networks(query.origin()).await;
    Json(NetworksResponse { networks })
}

/// Networks of one provider.
async fn provider_networks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OriginQuery>,
) -> Result<Json<NetworksResponse>, AppError> {
    let provider = lookup(&state, &id).await?;
    let networks = provider.get_networks(query.origin()).await;
    Ok(Json(NetworksResponse { networks }))
}

/// Cache and backend counters of one provider.
async fn provider_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProviderStats>, AppError> {
    let provider = lookup(&state, &id).await?;
    Ok(Json(provider.stats()))
}

/// Stations of a network, optionally within a bounding box.
async fn stations(
    State(state): State<AppState>,
    Path((id, network)): Path<(String, String)>,
    Query(query): Query<BoundsQuery>,
) -> Result<Json<StationsResponse>, AppError> {
    let bbox = query
        .bbox()
        .map_err(|message| AppError::BadRequest { message })?;
    let provider = lookup(&state, &id).await?;

    let limit = query.limit(provider.config().max_stations);
    let stations = provider.list_stations(&network, bbox, limit).await;

    Ok(Json(StationsResponse {
        provider: id,
        network,
        stations,
    }))
}

/// Center of a network's cached stations.
async fn network_center(
    State(state): State<AppState>,
    Path((id, network)): Path<(String, String)>,
) -> Result<Json<CenterResponse>, AppError> {
    let provider = lookup(&state, &id).await?;
    Ok(Json(provider.get_center(&network).await.into()))
}

/// Number of cached stations of a network within a bounding box.
async fn network_total(
    State(state): State<AppState>,
    Path((id, network)): Path<(String, String)>,
    Query(query): Query<BoundsQuery>,
) -> Result<Json<TotalResponse>, AppError> {
    let bbox = query
        .bbox()
        .map_err(|message| AppError::BadRequest { message })?;
    let provider = lookup(&state, &id).await?;

    let total = provider.get_total_stations(&network, bbox).await;
    Ok(Json(TotalResponse { total }))
}

async fn lookup(state: &AppState, id: &str) -> Result<Arc<Provider>, AppError> {
    state.app.registry().get(id).await.map_err(AppError::from)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<Arc<ProviderError>> for AppError {
    fn from(e: Arc<ProviderError>) -> Self {
        if e.is_not_found() {
            AppError::NotFound {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
