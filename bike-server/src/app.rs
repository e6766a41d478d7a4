//! Cross-provider operations.
//!
//! The registry answers questions about one provider at a time. The
//! application layer combines them: it lists every configured provider,
//! aggregates networks across providers and falls back to a default
//! provider when a requested one cannot be loaded.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::definitions::ResolvedDefinition;
use crate::domain::Network;
use crate::geo::{Coordinate, sort_by_distance};
use crate::provider::{Provider, ProviderError, ProviderRegistry};

/// The set of configured providers and the default among them.
#[derive(Debug, Clone)]
pub struct Application {
    registry: Arc<ProviderRegistry>,
    default_provider: String,
}

impl Application {
    pub fn new(registry: ProviderRegistry, default_provider: impl Into<String>) -> Self {
        Self {
            registry: Arc::new(registry),
            default_provider: default_provider.into(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Every provider definition available, sorted by name.
    pub fn list_providers(&self) -> Vec<ResolvedDefinition> {
        self.registry.store().list()
    }

    /// Networks of every provider, nearest first if `origin` is given.
    ///
    /// Providers are queried concurrently. A provider that cannot be loaded
    /// is logged and contributes nothing.
    pub async fn list_networks(&self, origin: Option<Coordinate>) -> Vec<Network> {
        let definitions = self.list_providers();

        let per_provider = join_all(definitions.iter().map(|definition| async move {
            match self.registry.get(&definition.id).await {
                Ok(provider) => provider.get_networks(None).await,
                Err(e) => {
                    warn!(provider = %definition.id, error = %e, "Skipping provider");
                    Vec::new()
                }
            }
        }))
        .await;

        let networks: Vec<Network> = per_provider.into_iter().flatten().collect();
        debug!(
            providers = definitions.len(),
            networks = networks.len(),
            "Aggregated networks"
        );

        match origin {
            Some(origin) => sort_by_distance(networks, origin),
            None => networks,
        }
    }

    /// Load provider `id`, or the default provider if `id` cannot be loaded.
    ///
    /// An error is returned only when the default provider itself fails.
    pub async fn provider_or_default(&self, id: &str) -> Result<Arc<Provider>, Arc<ProviderError>> {
        match self.registry.get(id).await {
            Ok(provider) => Ok(provider),
            Err(e) if id == self.default_provider => Err(e),
            Err(e) => {
                warn!(
                    provider = id,
                    default = %self.default_provider,
                    error = %e,
                    "Falling back to default provider"
                );
                self.registry.get(&self.default_provider).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendLoader;
    use crate::definitions::DefinitionStore;
    use crate::provider::ProviderConfig;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    /// Two fixture providers ("north", "south") and one that cannot load.
    fn app(default: &str) -> (TempDir, Application) {
        let dir = tempdir().unwrap();

        write(
            dir.path(),
            "providers/north.json",
            r#"{"name": "North Bikes", "backend": "fixture", "fixture": "../fixtures/north.json"}"#,
        );
        write(
            dir.path(),
            "fixtures/north.json",
            r#"{"networks": [
                {"id": "oslo", "name": "Oslo", "city": "Oslo", "country": "NO", "x": 10.75, "y": 59.91},
                {"id": "tromso", "name": "Tromso", "city": "Tromso", "country": "NO", "x": 18.96, "y": 69.65}
            ]}"#,
        );
        write(
            dir.path(),
            "providers/south.json",
            r#"{"name": "South Bikes", "backend": "fixture", "fixture": "../fixtures/south.json"}"#,
        );
        write(
            dir.path(),
            "fixtures/south.json",
            r#"{"networks": [
                {"id": "seville", "name": "Sevici", "city": "Seville", "country": "ES", "x": -5.98, "y": 37.39}
            ]}"#,
        );
        write(
            dir.path(),
            "providers/broken.json",
            r#"{"name": "Broken Bikes", "backend": "not-a-backend"}"#,
        );

        let registry = ProviderRegistry::new(
            DefinitionStore::system_only(dir.path()),
            BackendLoader::with_builtin(),
            ProviderConfig::default(),
        );
        (dir, Application::new(registry, default))
    }

    #[test]
    fn lists_all_definitions() {
        let (_dir, app) = app("north");

        let names: Vec<_> = app.list_providers().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["Broken Bikes", "North Bikes", "South Bikes"]);
    }

    #[tokio::test]
    async fn aggregates_networks_skipping_failures() {
        let (_dir, app) = app("north");

        let networks = app.list_networks(None).await;
        let ids: Vec<_> = networks.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["oslo", "tromso", "seville"]);
        assert_eq!(networks[2].provider_id, "south");
    }

    #[tokio::test]
    async fn aggregate_is_sorted_by_distance() {
        let (_dir, app) = app("north");

        // Madrid: Seville is nearest, Tromso furthest
        let networks = app.list_networks(Some(Coordinate::new(-3.70, 40.42))).await;
        let ids: Vec<_> = networks.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["seville", "oslo", "tromso"]);
    }

    #[tokio::test]
    async fn falls_back_to_default_provider() {
        let (_dir, app) = app("south");

        let provider = app.provider_or_default("nowhere").await.unwrap();
        assert_eq!(provider.id(), "south");

        let provider = app.provider_or_default("broken").await.unwrap();
        assert_eq!(provider.id(), "south");

        let provider = app.provider_or_default("north").await.unwrap();
        assert_eq!(provider.id(), "north");
    }

    #[tokio::test]
    async fn default_failure_propagates() {
        let (_dir, app) = app("broken");

        let err = app.provider_or_default("nowhere").await.unwrap_err();
        assert!(matches!(*err, ProviderError::Backend(_)));
    }
}
