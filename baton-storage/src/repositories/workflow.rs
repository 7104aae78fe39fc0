//! Workflow definition repository implementation

use std::collections::HashMap;

use async_trait::async_trait;
use baton_core::orchestration::collaborators::WorkflowStore;
use baton_core::workflow::WorkflowDefinition;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// In-memory repository for workflow definitions
#[derive(Debug, Default)]
pub struct WorkflowRepository {
    workflows: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl WorkflowRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new workflow definition
    pub async fn create(&self, workflow: &WorkflowDefinition) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        if workflows.contains_key(&workflow.id) {
            return Err(Error::already_exists("WorkflowDefinition", &workflow.id));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(())
    }

    /// Find a workflow definition by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<WorkflowDefinition>> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    /// Replace an existing workflow definition
    pub async fn update(&self, workflow: &WorkflowDefinition) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        if !workflows.contains_key(&workflow.id) {
            return Err(Error::not_found("WorkflowDefinition", &workflow.id));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(())
    }

    /// Delete a workflow definition
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        workflows
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("WorkflowDefinition", id))
    }

    /// List all workflow definitions, ordered by id
    pub async fn list(&self) -> Result<Vec<WorkflowDefinition>> {
        let mut workflows: Vec<WorkflowDefinition> =
            self.workflows.read().await.values().cloned().collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workflows)
    }

    /// Count stored workflow definitions
    pub async fn count(&self) -> Result<usize> {
        Ok(self.workflows.read().await.len())
    }
}

#[async_trait]
impl WorkflowStore for WorkflowRepository {
    async fn workflow(&self, id: &str) -> baton_core::Result<Option<WorkflowDefinition>> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    async fn workflow_ids(&self) -> baton_core::Result<Vec<String>> {
        let mut ids: Vec<String> = self.workflows.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::workflow::{ActionKind, WorkflowStep};

    fn workflow(id: &str) -> WorkflowDefinition {
        WorkflowDefinition::builder()
            .id(id)
            .step(
                WorkflowStep::builder()
                    .id("s1")
                    .action(ActionKind::Create)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = WorkflowRepository::new();
        repo.create(&workflow("alpha")).await.unwrap();

        let found = repo.find_by_id("alpha").await.unwrap().unwrap();
        assert_eq!(found.id, "alpha");
        assert!(repo.find_by_id("beta").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let repo = WorkflowRepository::new();
        repo.create(&workflow("alpha")).await.unwrap();
        assert!(matches!(
            repo.create(&workflow("alpha")).await.unwrap_err(),
            Error::AlreadyExists { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = WorkflowRepository::new();
        assert!(matches!(
            repo.update(&workflow("alpha")).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        repo.create(&workflow("alpha")).await.unwrap();
        repo.update(&workflow("alpha")).await.unwrap();
        repo.delete("alpha").await.unwrap();
        assert!(matches!(
            repo.delete("alpha").await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_store_trait_view() {
        let repo = WorkflowRepository::new();
        repo.create(&workflow("beta")).await.unwrap();
        repo.create(&workflow("alpha")).await.unwrap();

        let loaded = WorkflowStore::workflow(&repo, "beta").await.unwrap();
        assert!(loaded.is_some());
        assert_eq!(
            repo.workflow_ids().await.unwrap(),
            vec!["alpha".to_string(), "beta".to_string()]
        );
    }
}
