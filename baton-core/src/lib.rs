//! Core domain models and orchestration engine for Baton
//!
//! This crate contains the fundamental domain models and the workflow
//! execution engine used throughout the Baton system for guiding AI coding
//! agents through multi-step development tasks: roles with declared
//! capabilities and quality gates, workflow definitions, execution state
//! tracking, step dispatch, and role-to-role handoffs.

pub mod config;
pub mod error;
pub mod execution;
pub mod orchestration;
pub mod quality;
pub mod role;
pub mod template;
pub mod workflow;

pub use error::{Error, Result};

/// Common result type used throughout the core library
pub type CoreResult<T> = std::result::Result<T, Error>;
