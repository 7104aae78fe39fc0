//! Collaborator boundary traits
//!
//! The engine reads workflow definitions, quality rules, templates, and
//! agent profiles through these traits and never assumes a particular
//! persistence technology. Reference in-memory implementations live in the
//! `baton-storage` and `baton-templates` crates; tests supply their own
//! fixtures. Collaborator failures surface as [`crate::Error::Dependency`]
//! and are fatal to the triggering operation; retry policy belongs to the
//! caller.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::quality::QualityRule;
use crate::role::AgentProfile;
use crate::workflow::WorkflowDefinition;
use crate::Result;

/// Read-only source of workflow definitions
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a workflow definition by id
    async fn workflow(&self, id: &str) -> Result<Option<WorkflowDefinition>>;

    /// List known workflow ids
    async fn workflow_ids(&self) -> Result<Vec<String>>;
}

/// Supplier of the configured quality rule set
#[async_trait]
pub trait QualityRuleSource: Send + Sync {
    /// All configured rules, in evaluation order
    async fn rules(&self) -> Result<Vec<QualityRule>>;
}

/// Template rendering boundary
///
/// Implementations substitute `{{key}}` placeholders from a flat
/// string-keyed variable map; unknown keys are left unsubstituted, never an
/// error.
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    /// Render the template identified by `template_ref` with `variables`
    ///
    /// Returns `None` when the template is unknown.
    async fn render(
        &self,
        template_ref: &str,
        variables: &HashMap<String, String>,
    ) -> Result<Option<String>>;
}

/// Read-only source of agent profiles
#[async_trait]
pub trait AgentProfileStore: Send + Sync {
    /// Load a profile by id
    async fn profile(&self, id: &str) -> Result<Option<AgentProfile>>;

    /// List known profile ids
    async fn profile_ids(&self) -> Result<Vec<String>>;
}
