//! Template repository implementation

use std::collections::HashMap;

use baton_core::template::Template;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// In-memory repository for templates
#[derive(Debug, Default)]
pub struct TemplateRepository {
    templates: RwLock<HashMap<String, Template>>,
}

impl TemplateRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new template
    pub async fn create(&self, template: &Template) -> Result<()> {
        let mut templates = self.templates.write().await;
        if templates.contains_key(&template.id) {
            return Err(Error::already_exists("Template", &template.id));
        }
        templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    /// Find a template by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Template>> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    /// Replace an existing template
    pub async fn update(&self, template: &Template) -> Result<()> {
        let mut templates = self.templates.write().await;
        if !templates.contains_key(&template.id) {
            return Err(Error::not_found("Template", &template.id));
        }
        templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    /// Delete a template
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.templates
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Template", id))
    }

    /// List all templates, ordered by id
    pub async fn list(&self) -> Result<Vec<Template>> {
        let mut templates: Vec<Template> =
            self.templates.read().await.values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }

    /// Count stored templates
    pub async fn count(&self) -> Result<usize> {
        Ok(self.templates.read().await.len())
    }
}
