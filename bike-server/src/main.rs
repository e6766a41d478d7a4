use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bike_server::app::Application;
use bike_server::backend::BackendLoader;
use bike_server::definitions::DefinitionStore;
use bike_server::provider::{ProviderConfig, ProviderRegistry};
use bike_server::web::{AppState, create_router};

/// Default listen address.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Read an environment variable, falling back to `default` if unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %value, "Ignoring invalid setting");
            default
        }),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Definition directories: user definitions override the shipped ones
    let system_dir = env_or("BIKES_DATA_DIR", PathBuf::from("data"));
    let store = match std::env::var_os("BIKES_USER_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join("bike-server")))
    {
        Some(user_dir) => {
            info!(
                user = %user_dir.display(),
                system = %system_dir.display(),
                "Definition directories"
            );
            DefinitionStore::new(user_dir, system_dir)
        }
        None => {
            info!(system = %system_dir.display(), "Definition directory");
            DefinitionStore::system_only(system_dir)
        }
    };

    // Provider cache configuration
    let defaults = ProviderConfig::default();
    let config = ProviderConfig::default()
        .with_max_stations(env_or("BIKES_MAX_STATIONS", defaults.max_stations))
        .with_station_ttl(Duration::from_secs(env_or(
            "BIKES_STATION_TTL_SECS",
            defaults.station_ttl.as_secs(),
        )));

    let loader = BackendLoader::with_builtin();
    info!(backends = ?loader.kinds(), "Backends registered");

    let registry = ProviderRegistry::new(store, loader, config);
    let default_provider = env_or("BIKES_DEFAULT_PROVIDER", "citybikes".to_string());
    let app = Application::new(registry, default_provider);

    let providers = app.list_providers();
    if providers.is_empty() {
        warn!("No provider definitions found");
    }
    for definition in &providers {
        info!(id = %definition.id, name = %definition.name(), "Provider available");
    }

    // Create router
    let router = create_router(AppState::new(app));

    // Bind and serve
    let default_addr: SocketAddr = DEFAULT_ADDR.parse().expect("Invalid default address");
    let addr = env_or("BIKES_ADDR", default_addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    info!(%addr, "Bike-share server listening");

    axum::serve(listener, router).await.expect("Server error");
}
