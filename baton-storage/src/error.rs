//! Error types for the storage layer

use thiserror::Error;

/// Storage error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Core domain error: {0}")]
    Core(#[from] baton_core::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Entity already exists: {entity_type} with id {id}")]
    AlreadyExists { entity_type: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Create a not found error for a specific entity type and ID
    pub fn not_found<S1: Into<String>, S2: Into<String>>(entity_type: S1, id: S2) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create an already-exists error for a duplicate insert
    pub fn already_exists<S1: Into<String>, S2: Into<String>>(entity_type: S1, id: S2) -> Self {
        Self::AlreadyExists {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// Convenience result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("WorkflowDefinition", "feature-delivery");
        let display = format!("{}", err);
        assert!(display.contains("WorkflowDefinition"));
        assert!(display.contains("feature-delivery"));

        let err = Error::already_exists("Template", "module");
        assert!(format!("{}", err).contains("already exists"));
    }

    #[test]
    fn test_core_error_conversion() {
        let core_err = baton_core::Error::validation("bad input");
        let storage_err: Error = core_err.into();
        assert!(matches!(storage_err, Error::Core(_)));
    }
}
