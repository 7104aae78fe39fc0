//! Template rendering for Baton workflow steps
//!
//! This crate provides `{{key}}` placeholder substitution and a store-backed
//! template catalog implementing the engine's rendering boundary.

pub mod catalog;
pub mod error;
pub mod renderer;

pub use catalog::TemplateCatalog;
pub use error::{Error, Result};
pub use renderer::TemplateRenderer;

/// Re-export core types for convenience
pub use baton_core as core;
pub use baton_storage as storage;
