//! Error types for template rendering

use thiserror::Error;

/// Template rendering error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] baton_storage::Error),

    #[error("Core domain error: {0}")]
    Core(#[from] baton_core::Error),

    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    #[error("Invalid template syntax: {0}")]
    InvalidTemplate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for template operations
pub type Result<T> = std::result::Result<T, Error>;
