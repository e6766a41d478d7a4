//! Process-wide provider instances.
//!
//! Each provider id maps to exactly one [`Provider`] for the lifetime of the
//! registry. Concurrent requests for an id that is still being constructed
//! wait for that construction instead of starting their own.

use std::sync::Arc;

use moka::future::Cache as MokaCache;

use crate::backend::BackendLoader;
use crate::definitions::DefinitionStore;

use super::config::ProviderConfig;
use super::error::ProviderError;
use super::provider::Provider;

/// Lazily constructed providers keyed by id.
pub struct ProviderRegistry {
    store: DefinitionStore,
    loader: BackendLoader,
    config: ProviderConfig,

    /// Constructed providers. Unbounded, entries are never evicted.
    providers: MokaCache<String, Arc<Provider>>,
}

impl ProviderRegistry {
    pub fn new(store: DefinitionStore, loader: BackendLoader, config: ProviderConfig) -> Self {
        Self {
            store,
            loader,
            config,
            providers: MokaCache::builder().build(),
        }
    }

    /// Return the provider for `id`, constructing it on first use.
    ///
    /// Construction errors are returned to every caller waiting on that
    /// construction and nothing is stored, so a later call tries again.
    pub async fn get(&self, id: &str) -> Result<Arc<Provider>, Arc<ProviderError>> {
        self.providers
            .try_get_with_by_ref(id, async {
                Provider::open(id, &self.store, &self.loader, self.config.clone()).map(Arc::new)
            })
            .await
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Ids of the providers constructed so far, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .providers
            .iter()
            .map(|(id, _)| id.as_ref().clone())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("store", &self.store)
            .field("loader", &self.loader)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixtureBackend;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{TempDir, tempdir};

    fn write_definition(dir: &Path, id: &str, contents: &str) {
        let providers = dir.join("providers");
        std::fs::create_dir_all(&providers).unwrap();
        std::fs::write(providers.join(format!("{id}.json")), contents).unwrap();
    }

    /// Registry over a temp dir whose "static" backend counts constructions.
    fn counting_registry() -> (TempDir, Arc<AtomicUsize>, ProviderRegistry) {
        let dir = tempdir().unwrap();
        write_definition(dir.path(), "alpha", r#"{"name": "Alpha", "backend": "static"}"#);
        write_definition(dir.path(), "beta", r#"{"name": "Beta", "backend": "static"}"#);
        write_definition(dir.path(), "ghost", r#"{"name": "Ghost", "backend": "missing"}"#);

        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let loader = BackendLoader::new().with("static", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FixtureBackend::default()))
        });

        let registry = ProviderRegistry::new(
            DefinitionStore::system_only(dir.path()),
            loader,
            ProviderConfig::default(),
        );
        (dir, built, registry)
    }

    #[tokio::test]
    async fn same_id_returns_same_instance() {
        let (_dir, built, registry) = counting_registry();

        let first = registry.get("alpha").await.unwrap();
        let second = registry.get("alpha").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Alpha");
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_ids_are_different_instances() {
        let (_dir, built, registry) = counting_registry();

        let alpha = registry.get("alpha").await.unwrap();
        let beta = registry.get("beta").await.unwrap();

        assert!(!Arc::ptr_eq(&alpha, &beta));
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(registry.loaded(), vec!["alpha", "beta"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_construction_happens_once() {
        let (_dir, built, registry) = counting_registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.get("alpha").await.unwrap() })
            })
            .collect();

        let providers = futures::future::join_all(handles).await;
        let first = providers[0].as_ref().unwrap();
        for provider in &providers {
            assert!(Arc::ptr_eq(first, provider.as_ref().unwrap()));
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_provider_is_not_found_and_not_cached() {
        let (_dir, _built, registry) = counting_registry();

        let err = registry.get("nowhere").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(registry.loaded().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_propagates_and_is_retried() {
        let (dir, _built, registry) = counting_registry();

        let err = registry.get("ghost").await.unwrap_err();
        assert!(matches!(*err, ProviderError::Backend(_)));
        assert!(!err.is_not_found());

        // Fixing the definition makes the next lookup succeed
        write_definition(dir.path(), "ghost", r#"{"name": "Ghost", "backend": "static"}"#);
        assert!(registry.get("ghost").await.is_ok());
    }
}
