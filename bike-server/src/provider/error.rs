//! Provider construction errors.

use crate::backend::BackendLoadError;
use crate::definitions::DefinitionError;

/// Errors that can occur when constructing a provider.
///
/// Query operations never return errors; only construction can fail.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider's definition could not be resolved
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The provider's backend could not be loaded
    #[error(transparent)]
    Backend(#[from] BackendLoadError),
}

impl ProviderError {
    /// Whether the provider simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::Definition(DefinitionError::NotFound { .. })
                | ProviderError::Definition(DefinitionError::InvalidId(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        let err = ProviderError::from(DefinitionError::NotFound {
            id: "x".into(),
            searched: vec![],
        });
        assert!(err.is_not_found());

        let err = ProviderError::from(BackendLoadError::UnknownBackend {
            provider_id: "x".into(),
            kind: "y".into(),
        });
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "no backend \"y\" for provider \"x\"");
    }
}
