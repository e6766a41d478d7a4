//! Provider definitions on disk.
//!
//! A definition is a JSON file at `<dir>/providers/<id>.json` holding the
//! provider's display name, the backend that implements it and any other
//! display metadata. Definitions in the user directory override those with
//! the same id in the system directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::error::DefinitionError;

/// Subdirectory of each data directory holding definition files.
const PROVIDERS_DIR: &str = "providers";

/// Contents of a provider definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    /// Display name.
    pub name: String,

    /// Backend implementing the provider. Defaults to the provider id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Other display metadata, kept as-is.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A definition together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDefinition {
    pub id: String,
    pub path: PathBuf,
    pub definition: ProviderDefinition,
}

impl ResolvedDefinition {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Name of the backend implementation to load.
    pub fn backend_kind(&self) -> &str {
        self.definition.backend.as_deref().unwrap_or(&self.id)
    }

    /// String metadata field, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.definition.metadata.get(key).and_then(Value::as_str)
    }

    /// Resolve a path named in the definition against the definition's directory.
    pub fn relative_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.path.parent() {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}

/// Lookup of provider definitions with user-over-system precedence.
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    user_dir: Option<PathBuf>,
    system_dir: PathBuf,
}

impl DefinitionStore {
    /// Create a store searching `user_dir` before `system_dir`.
    pub fn new(user_dir: impl Into<PathBuf>, system_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_dir: Some(user_dir.into()),
            system_dir: system_dir.into(),
        }
    }

    /// Create a store with only a system directory.
    pub fn system_only(system_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_dir: None,
            system_dir: system_dir.into(),
        }
    }

    /// Data directories in lookup order.
    fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.user_dir
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.system_dir.as_path()))
    }

    /// Resolve the definition for `id`.
    pub fn resolve(&self, id: &str) -> Result<ResolvedDefinition, DefinitionError> {
        validate_id(id)?;

        let file_name = format!("{id}.json");
        let searched: Vec<PathBuf> = self
            .dirs()
            .map(|dir| dir.join(PROVIDERS_DIR).join(&file_name))
            .collect();

        let path = searched
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| DefinitionError::NotFound {
                id: id.to_string(),
                searched: searched.clone(),
            })?;

        let definition = read_definition(&path)?;
        Ok(ResolvedDefinition {
            id: id.to_string(),
            path,
            definition,
        })
    }

    /// List every available definition, sorted by name.
    ///
    /// User definitions hide system definitions with the same id. Files that
    /// cannot be read or parsed are skipped with a warning.
    pub fn list(&self) -> Vec<ResolvedDefinition> {
        let mut found: HashMap<String, ResolvedDefinition> = HashMap::new();

        for dir in self.dirs() {
            let entries = match std::fs::read_dir(dir.join(PROVIDERS_DIR)) {
                Ok(entries) => entries,
                Err(_) => continue,
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }

                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if found.contains_key(id) || validate_id(id).is_err() {
                    continue;
                }

                match read_definition(&path) {
                    Ok(definition) => {
                        found.insert(
                            id.to_string(),
                            ResolvedDefinition {
                                id: id.to_string(),
                                path,
                                definition,
                            },
                        );
                    }
                    Err(e) => warn!(error = %e, "Skipping provider definition"),
                }
            }
        }

        let mut definitions: Vec<_> = found.into_values().collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id.cmp(&b.id)));
        definitions
    }
}

/// Provider ids name files, so only a conservative character set is allowed.
fn validate_id(id: &str) -> Result<(), DefinitionError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DefinitionError::InvalidId(id.to_string()))
    }
}

fn read_definition(path: &Path) -> Result<ProviderDefinition, DefinitionError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| DefinitionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn write_definition(dir: &Path, id: &str, contents: &str) {
        let providers = dir.join(PROVIDERS_DIR);
        std::fs::create_dir_all(&providers).unwrap();
        std::fs::write(providers.join(format!("{id}.json")), contents).unwrap();
    }

    fn store() -> (TempDir, TempDir, DefinitionStore) {
        let user = tempdir().unwrap();
        let system = tempdir().unwrap();
        let store = DefinitionStore::new(user.path(), system.path());
        (user, system, store)
    }

    #[test]
    fn resolves_system_definition() {
        let (_user, system, store) = store();
        write_definition(system.path(), "citybikes", r#"{"name": "CityBikes"}"#);

        let resolved = store.resolve("citybikes").unwrap();
        assert_eq!(resolved.id, "citybikes");
        assert_eq!(resolved.name(), "CityBikes");
        assert_eq!(resolved.backend_kind(), "citybikes");
        assert!(resolved.path.starts_with(system.path()));
    }

    #[test]
    fn user_definition_wins() {
        let (user, system, store) = store();
        write_definition(system.path(), "hsl", r#"{"name": "System HSL"}"#);
        write_definition(user.path(), "hsl", r#"{"name": "My HSL"}"#);

        let resolved = store.resolve("hsl").unwrap();
        assert_eq!(resolved.name(), "My HSL");
        assert!(resolved.path.starts_with(user.path()));
    }

    #[test]
    fn missing_definition_is_not_found() {
        let (_user, _system, store) = store();

        match store.resolve("nowhere") {
            Err(DefinitionError::NotFound { id, searched }) => {
                assert_eq!(id, "nowhere");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let (_user, system, store) = store();
        write_definition(system.path(), "broken", "{not json");

        assert!(matches!(
            store.resolve("broken"),
            Err(DefinitionError::Parse { .. })
        ));
    }

    #[test]
    fn missing_name_is_parse_error() {
        let (_user, system, store) = store();
        write_definition(system.path(), "nameless", r#"{"backend": "citybikes"}"#);

        assert!(matches!(
            store.resolve("nameless"),
            Err(DefinitionError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_path_like_ids() {
        let (_user, _system, store) = store();

        for id in ["", "../secrets", "a/b", "a.b"] {
            assert!(
                matches!(store.resolve(id), Err(DefinitionError::InvalidId(_))),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn backend_and_metadata_are_read() {
        let (_user, system, store) = store();
        write_definition(
            system.path(),
            "local",
            r#"{"name": "Local", "backend": "fixture", "fixture": "local-data.json", "color": "red"}"#,
        );

        let resolved = store.resolve("local").unwrap();
        assert_eq!(resolved.backend_kind(), "fixture");
        assert_eq!(resolved.metadata_str("fixture"), Some("local-data.json"));
        assert_eq!(resolved.metadata_str("color"), Some("red"));
        assert_eq!(
            resolved.relative_path("local-data.json"),
            system.path().join(PROVIDERS_DIR).join("local-data.json")
        );
    }

    #[test]
    fn list_merges_and_sorts_by_name() {
        let (user, system, store) = store();
        write_definition(system.path(), "hsl", r#"{"name": "HSL"}"#);
        write_definition(system.path(), "citybikes", r#"{"name": "CityBikes"}"#);
        write_definition(user.path(), "hsl", r#"{"name": "Alt HSL"}"#);
        write_definition(user.path(), "broken", "[]");

        let listed = store.list();
        let names: Vec<_> = listed.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Alt HSL", "CityBikes"]);
    }

    #[test]
    fn list_without_directories_is_empty() {
        let store = DefinitionStore::system_only("/nonexistent/bike-server/data");
        assert!(store.list().is_empty());
    }
}
