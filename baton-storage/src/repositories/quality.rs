//! Quality rule repository implementation
//!
//! Rules keep their insertion order; the gate evaluator runs them in the
//! order this repository reports them.

use async_trait::async_trait;
use baton_core::orchestration::collaborators::QualityRuleSource;
use baton_core::quality::QualityRule;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// In-memory repository for quality rules
#[derive(Debug, Default)]
pub struct QualityRuleRepository {
    rules: RwLock<Vec<QualityRule>>,
}

impl QualityRuleRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new rule
    pub async fn create(&self, rule: &QualityRule) -> Result<()> {
        let mut rules = self.rules.write().await;
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(Error::already_exists("QualityRule", &rule.id));
        }
        rules.push(rule.clone());
        Ok(())
    }

    /// Find a rule by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<QualityRule>> {
        Ok(self.rules.read().await.iter().find(|r| r.id == id).cloned())
    }

    /// Remove a rule
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.id != id);
        if rules.len() == before {
            return Err(Error::not_found("QualityRule", id));
        }
        Ok(())
    }

    /// All rules in insertion order
    pub async fn list(&self) -> Result<Vec<QualityRule>> {
        Ok(self.rules.read().await.clone())
    }

    /// Count stored rules
    pub async fn count(&self) -> Result<usize> {
        Ok(self.rules.read().await.len())
    }
}

#[async_trait]
impl QualityRuleSource for QualityRuleRepository {
    async fn rules(&self) -> baton_core::Result<Vec<QualityRule>> {
        Ok(self.rules.read().await.clone())
    }
}
