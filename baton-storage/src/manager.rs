//! Storage manager bundling all repositories

use std::sync::Arc;

use baton_core::quality::QualityRule;
use baton_core::role::AgentProfile;
use baton_core::template::Template;
use baton_core::workflow::WorkflowDefinition;
use tracing::info;

use crate::repositories::{
    AgentProfileRepository, QualityRuleRepository, TemplateRepository, WorkflowRepository,
};
use crate::Result;

/// Central access point for all collaborator repositories
///
/// Repositories are shared behind `Arc` so the same manager can feed the
/// orchestrator's collaborator slots and any administrative surface at the
/// same time.
#[derive(Debug, Clone, Default)]
pub struct StorageManager {
    workflows: Arc<WorkflowRepository>,
    quality_rules: Arc<QualityRuleRepository>,
    templates: Arc<TemplateRepository>,
    profiles: Arc<AgentProfileRepository>,
}

impl StorageManager {
    /// Create a manager over empty repositories
    pub fn new() -> Self {
        Self::default()
    }

    /// Workflow definition repository
    pub fn workflows(&self) -> Arc<WorkflowRepository> {
        Arc::clone(&self.workflows)
    }

    /// Quality rule repository
    pub fn quality_rules(&self) -> Arc<QualityRuleRepository> {
        Arc::clone(&self.quality_rules)
    }

    /// Template repository
    pub fn templates(&self) -> Arc<TemplateRepository> {
        Arc::clone(&self.templates)
    }

    /// Agent profile repository
    pub fn profiles(&self) -> Arc<AgentProfileRepository> {
        Arc::clone(&self.profiles)
    }

    /// Seed the repositories in one call
    ///
    /// Convenience for tests and process startup; duplicate ids surface as
    /// errors from the individual repositories.
    pub async fn seed(
        &self,
        workflows: Vec<WorkflowDefinition>,
        rules: Vec<QualityRule>,
        templates: Vec<Template>,
        profiles: Vec<AgentProfile>,
    ) -> Result<()> {
        for workflow in &workflows {
            self.workflows.create(workflow).await?;
        }
        for rule in &rules {
            self.quality_rules.create(rule).await?;
        }
        for template in &templates {
            self.templates.create(template).await?;
        }
        for profile in &profiles {
            self.profiles.create(profile).await?;
        }
        info!(
            workflows = workflows.len(),
            rules = rules.len(),
            templates = templates.len(),
            profiles = profiles.len(),
            "seeded storage"
        );
        Ok(())
    }
}
