//! Store-backed template catalog
//!
//! Bridges the template repository to the engine's rendering boundary: the
//! catalog fetches template bodies by id and runs them through the
//! [`TemplateRenderer`]. This is the piece the orchestrator's step
//! dispatcher talks to.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use baton_core::orchestration::collaborators::TemplateEngine;
use baton_core::template::Template;
use baton_storage::repositories::TemplateRepository;
use tracing::debug;

use crate::renderer::TemplateRenderer;
use crate::Result;

/// Renders templates stored in a repository
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Arc<TemplateRepository>,
    renderer: TemplateRenderer,
}

impl TemplateCatalog {
    /// Create a catalog over a template repository
    pub fn new(templates: Arc<TemplateRepository>) -> Self {
        Self {
            templates,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Register a template in the underlying repository
    pub async fn register(&self, template: &Template) -> Result<()> {
        self.templates.create(template).await?;
        Ok(())
    }

    /// Render a stored template by id
    ///
    /// Returns `None` for unknown ids; unknown placeholder keys stay
    /// verbatim in the output.
    pub async fn render_by_id(
        &self,
        id: &str,
        variables: &HashMap<String, String>,
    ) -> Result<Option<String>> {
        let template = self.templates.find_by_id(id).await?;
        Ok(template.map(|t| {
            debug!(template = %id, "rendering template");
            self.renderer.render(&t.content, variables)
        }))
    }
}

#[async_trait]
impl TemplateEngine for TemplateCatalog {
    async fn render(
        &self,
        template_ref: &str,
        variables: &HashMap<String, String>,
    ) -> baton_core::Result<Option<String>> {
        self.render_by_id(template_ref, variables)
            .await
            .map_err(|e| baton_core::Error::dependency("template-catalog", e.to_string()))
    }
}
