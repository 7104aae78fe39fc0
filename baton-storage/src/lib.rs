//! Storage layer for the Baton engine
//!
//! This crate provides seedable in-memory repository implementations for
//! every collaborator the engine reads through: workflow definitions,
//! quality rules, templates, and agent profiles. The repositories implement
//! the boundary traits from `baton-core`, so swapping in a persistent
//! backend is a matter of implementing the same traits.

pub mod error;
pub mod manager;
pub mod repositories;

pub use error::{Error, Result};
pub use manager::StorageManager;

/// Re-export core types for convenience
pub use baton_core as core;
