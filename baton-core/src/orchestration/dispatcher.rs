//! Step action dispatch
//!
//! Maps a step's action kind to a concrete handler. The action set is a
//! closed enumeration, so dispatch is an exhaustive `match` checked at
//! compile time; there is no "unknown action" runtime failure mode. Handler
//! failures (a dangling template reference, a failing collaborator) are
//! captured on the returned result and never propagate as panics; the
//! orchestrator records them on the step execution and keeps collecting.
//!
//! Handlers are role-aware: the same action kind renders content and
//! suggestions differently per role, but the contract (inputs and outputs)
//! is identical across roles.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::execution::MetricsDelta;
use crate::orchestration::collaborators::TemplateEngine;
use crate::quality::QualityCheckResult;
use crate::role::Role;
use crate::workflow::{ActionKind, WorkflowStep};
use crate::Result;

/// Outcome of dispatching one step
#[derive(Debug, Clone)]
pub struct StepDispatchResult {
    pub success: bool,
    /// Artifact produced by the handler; quality rules run against this
    pub output: String,
    pub metrics: MetricsDelta,
    /// Checks a handler performed itself, ahead of gate evaluation
    pub quality_checks: Vec<QualityCheckResult>,
    /// Advisory suggestions; never consulted by gate logic
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

impl StepDispatchResult {
    fn completed(output: String, metrics: MetricsDelta, suggestions: Vec<String>) -> Self {
        Self {
            success: true,
            output,
            metrics,
            quality_checks: Vec::new(),
            suggestions,
            error: None,
        }
    }

    fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            output: String::new(),
            metrics: MetricsDelta::default(),
            quality_checks: Vec::new(),
            suggestions: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Dispatches steps to action-kind handlers
pub struct StepActionDispatcher {
    templates: Arc<dyn TemplateEngine>,
    config: EngineConfig,
}

impl StepActionDispatcher {
    /// Create a dispatcher over the template rendering boundary
    pub fn new(templates: Arc<dyn TemplateEngine>, config: EngineConfig) -> Self {
        Self { templates, config }
    }

    /// Execute one step for the given role
    ///
    /// Never returns an error for handler-level failures; those are captured
    /// on the result so the orchestrator can record them and continue the
    /// batch.
    pub async fn execute_step(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> StepDispatchResult {
        debug!(step = %step.id, action = %step.action, role = %role.id, "dispatching step");

        let mut scoped = variables.clone();
        scoped.insert("step_id".to_string(), step.id.clone());
        scoped.insert("step_name".to_string(), step.name.clone());
        scoped.insert("role".to_string(), role.id.clone());
        scoped.insert("role_name".to_string(), role.name.clone());
        scoped.insert("action".to_string(), step.action.as_str().to_string());

        let outcome = match step.action {
            ActionKind::Create => self.handle_create(step, role, &scoped).await,
            ActionKind::Modify => self.handle_modify(step, role, &scoped).await,
            ActionKind::Validate => self.handle_validate(step, role, &scoped).await,
            ActionKind::Test => self.handle_test(step, role, &scoped).await,
            ActionKind::Document => self.handle_document(step, role, &scoped).await,
            ActionKind::Analyze => self.handle_analyze(step, role, &scoped).await,
        };

        match outcome {
            Ok(mut result) => {
                if !self.config.advisory_suggestions {
                    result.suggestions.clear();
                }
                result
            }
            Err(e) => {
                warn!(step = %step.id, error = %e, "step dispatch failed");
                StepDispatchResult::failed(format!(
                    "Step '{}' ({}) failed: {}",
                    step.id, step.action, e
                ))
            }
        }
    }

    /// Render the step's template, or fall back to generated content
    ///
    /// A declared-but-unknown template reference fails the step rather than
    /// silently producing fallback content.
    async fn render_or_default(
        &self,
        step: &WorkflowStep,
        variables: &HashMap<String, String>,
        fallback: String,
    ) -> Result<String> {
        match &step.template {
            Some(template_ref) => {
                match self.templates.render(template_ref, variables).await? {
                    Some(content) => Ok(content),
                    None => Err(crate::Error::not_found("Template", template_ref.clone())),
                }
            }
            None => Ok(fallback),
        }
    }

    async fn handle_create(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let fallback = format!(
            "// {} (created by {})\n// Step: {}\n",
            step.name, role.name, step.id
        );
        let content = self.render_or_default(step, variables, fallback).await?;
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta {
                files_created: 1,
                ..MetricsDelta::default()
            },
            vec![format!(
                "Review the scaffold produced by '{}' before extending it",
                step.id
            )],
        ))
    }

    async fn handle_modify(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let mut content = self
            .render_or_default(
                step,
                variables,
                format!("Modification plan for step '{}' ({})\n", step.id, role.name),
            )
            .await?;
        if !step.modification_rules.is_empty() {
            content.push_str(&format!(
                "Applied rules: {}\n",
                step.modification_rules.join(", ")
            ));
        }
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta {
                files_modified: 1,
                ..MetricsDelta::default()
            },
            Vec::new(),
        ))
    }

    async fn handle_validate(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let target = variables
            .get("validation_target")
            .cloned()
            .unwrap_or_else(|| "the changes from previous steps".to_string());
        let content = format!(
            "Validation report for {} by {}\nScope: step '{}'\n",
            target, role.name, step.id
        );
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta::default(),
            vec!["Record findings as review comments for the next role".to_string()],
        ))
    }

    async fn handle_test(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let content = self
            .render_or_default(
                step,
                variables,
                format!("Test suite for step '{}' authored by {}\n", step.id, role.name),
            )
            .await?;
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta {
                tests_written: 1,
                ..MetricsDelta::default()
            },
            vec!["Cover the failure paths, not only the happy path".to_string()],
        ))
    }

    async fn handle_document(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let content = self
            .render_or_default(
                step,
                variables,
                format!("# {}\n\nDocumented by {}.\n", step.name, role.name),
            )
            .await?;
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta {
                files_created: 1,
                ..MetricsDelta::default()
            },
            Vec::new(),
        ))
    }

    async fn handle_analyze(
        &self,
        step: &WorkflowStep,
        role: &Role,
        variables: &HashMap<String, String>,
    ) -> Result<StepDispatchResult> {
        let subject = variables
            .get("analysis_subject")
            .cloned()
            .unwrap_or_else(|| "the current workspace".to_string());
        let content = format!(
            "Analysis of {} for step '{}'\nPerformed by {} ({})\n",
            subject,
            step.id,
            role.name,
            role.capabilities
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(StepDispatchResult::completed(
            content,
            MetricsDelta::default(),
            vec!["Feed analysis conclusions into the handoff notes".to_string()],
        ))
    }
}
