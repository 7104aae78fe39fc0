//! Workflow orchestration driver
//!
//! The orchestrator drives one role cycle at a time: it selects the steps
//! assigned to the execution's current role, dispatches them in order,
//! collects quality results, folds satisfied gates into the execution
//! context, and decides whether to hand off to the next role, complete the
//! execution, or surface the collected failures.
//!
//! Step failures do not abort a cycle: the failing step is recorded, the
//! remaining steps still run, and the aggregate report carries
//! `success: false` with every collected error. Steps that completed in a
//! failed cycle are retained and skipped when the cycle is retried; only
//! failed steps are re-dispatched.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::execution::{Execution, ExecutionStatus, MetricsDelta, StepExecutionUpdate, StepStatus};
use crate::orchestration::collaborators::{
    AgentProfileStore, QualityRuleSource, TemplateEngine, WorkflowStore,
};
use crate::orchestration::dispatcher::StepActionDispatcher;
use crate::orchestration::models::{RoleCycleReport, StepReport};
use crate::orchestration::quality_gate::QualityGateEvaluator;
use crate::orchestration::registry::RoleRegistry;
use crate::orchestration::tracker::ExecutionTracker;
use crate::quality::QualityCheckResult;
use crate::{Error, Result};

/// Variable key carrying the agent profile an execution was created for
const AGENT_PROFILE_VAR: &str = "agent_profile";

/// Top-level driver over registry, tracker, dispatcher, and evaluator
pub struct WorkflowOrchestrator {
    registry: Arc<RoleRegistry>,
    tracker: Arc<ExecutionTracker>,
    dispatcher: StepActionDispatcher,
    evaluator: QualityGateEvaluator,
    workflows: Arc<dyn WorkflowStore>,
    profiles: Arc<dyn AgentProfileStore>,
    config: EngineConfig,
}

impl WorkflowOrchestrator {
    /// Assemble an orchestrator from prebuilt components
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<RoleRegistry>,
        tracker: Arc<ExecutionTracker>,
        dispatcher: StepActionDispatcher,
        evaluator: QualityGateEvaluator,
        workflows: Arc<dyn WorkflowStore>,
        profiles: Arc<dyn AgentProfileStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            tracker,
            dispatcher,
            evaluator,
            workflows,
            profiles,
            config,
        }
    }

    /// Build an orchestrator from collaborators, loading the quality rule
    /// set up front
    pub async fn connect(
        registry: Arc<RoleRegistry>,
        workflows: Arc<dyn WorkflowStore>,
        templates: Arc<dyn TemplateEngine>,
        profiles: Arc<dyn AgentProfileStore>,
        rules: Arc<dyn QualityRuleSource>,
        config: EngineConfig,
    ) -> Result<Self> {
        let rule_set = rules.rules().await?;
        let evaluator = QualityGateEvaluator::new(rule_set)?;
        let dispatcher = StepActionDispatcher::new(templates, config.clone());
        Ok(Self::new(
            registry,
            Arc::new(ExecutionTracker::new()),
            dispatcher,
            evaluator,
            workflows,
            profiles,
            config,
        ))
    }

    /// The execution tracker backing this orchestrator
    pub fn tracker(&self) -> &Arc<ExecutionTracker> {
        &self.tracker
    }

    /// Create a new execution for a workflow
    ///
    /// The initial role comes from the agent profile (its first supported
    /// role known to the registry); without a profile, the registry's first
    /// role is used.
    pub async fn create_execution(
        &self,
        workflow_id: &str,
        agent_profile: Option<&str>,
        mut variables: HashMap<String, String>,
    ) -> Result<Execution> {
        let workflow = self
            .workflows
            .workflow(workflow_id)
            .await?
            .ok_or_else(|| Error::not_found("Workflow", workflow_id))?;

        let initial_role = match agent_profile {
            Some(profile_id) => {
                // Profiles registered with the registry win; the profile
                // store collaborator covers agents configured at runtime.
                let supported: Vec<String> = if self.registry.agent_profile(profile_id).is_some() {
                    self.registry
                        .roles_for_agent(profile_id)?
                        .iter()
                        .map(|r| r.id.clone())
                        .collect()
                } else {
                    let profile = self
                        .profiles
                        .profile(profile_id)
                        .await?
                        .ok_or_else(|| Error::not_found("AgentProfile", profile_id))?;
                    profile
                        .supported_roles
                        .iter()
                        .filter(|id| self.registry.role(id).is_some())
                        .cloned()
                        .collect()
                };
                let first = supported.into_iter().next().ok_or_else(|| {
                    Error::configuration(format!(
                        "Agent profile '{}' supports no role known to the registry",
                        profile_id
                    ))
                })?;
                variables.insert(AGENT_PROFILE_VAR.to_string(), profile_id.to_string());
                first
            }
            None => self
                .registry
                .roles()
                .first()
                .map(|r| r.id.clone())
                .ok_or_else(|| Error::configuration("Role registry is empty"))?,
        };

        self.tracker
            .create_execution(&workflow.id, &initial_role, variables)
            .await
    }

    /// Pause an execution on behalf of a caller
    pub async fn pause(&self, execution_id: Uuid, reason: &str) -> Result<Execution> {
        self.tracker.pause_execution(execution_id, reason).await
    }

    /// Resume a paused execution
    pub async fn resume(&self, execution_id: Uuid) -> Result<Execution> {
        self.tracker.resume_execution(execution_id).await
    }

    /// Run one role cycle for an execution
    ///
    /// Dispatches every not-yet-completed step owned by the current role, in
    /// ascending order index, then either completes the execution (terminal
    /// role, clean batch) or attempts the handoff to the first declared next
    /// role.
    pub async fn run_role_cycle(&self, execution_id: Uuid) -> Result<RoleCycleReport> {
        let execution = self.tracker.execution(execution_id).await?;
        execution.ensure_active()?;
        if execution.status != ExecutionStatus::Running {
            return Err(Error::state_transition(
                "Execution is paused; resume it before running a role cycle",
            ));
        }

        let role = match self.registry.role(&execution.current_role) {
            Some(role) => role.clone(),
            None => {
                let message = format!("invalid role: {}", execution.current_role);
                warn!(execution = %execution_id, role = %execution.current_role, "unknown current role");
                self.tracker
                    .fail_execution(execution_id, "invalid role", Some(message.clone()))
                    .await?;
                return self
                    .report(execution_id, vec![], vec![message], vec![], false, false)
                    .await;
            }
        };

        let workflow = self
            .workflows
            .workflow(&execution.workflow_id)
            .await?
            .ok_or_else(|| Error::not_found("Workflow", execution.workflow_id.clone()))?;

        let mut selected: Vec<_> = workflow
            .steps_for_role(&role)
            .into_iter()
            .filter(|s| !execution.step_completed(&s.id))
            .cloned()
            .collect();
        if let Some(limit) = self.config.max_steps_per_cycle {
            selected.truncate(limit);
        }
        debug!(
            execution = %execution_id,
            role = %role.id,
            steps = selected.len(),
            "selected steps for role cycle"
        );

        let mut step_reports: Vec<StepReport> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut suggestions: Vec<String> = Vec::new();
        let mut batch_checks: Vec<QualityCheckResult> = Vec::new();
        let mut batch_failed = false;

        for step in &selected {
            let record = self
                .tracker
                .add_step_execution(execution_id, &step.id, &role.id)
                .await?;
            self.tracker
                .set_current_step(execution_id, Some(step.id.clone()))
                .await?;
            self.tracker
                .update_step_execution(record.id, StepExecutionUpdate::status(StepStatus::Running))
                .await?;

            let dispatch = self
                .dispatcher
                .execute_step(step, &role, &execution.context.variables)
                .await;

            if dispatch.success {
                let mut checks = dispatch.quality_checks.clone();
                checks.extend(self.evaluator.run_checks(step, &role, &dispatch.output));

                let updated = self
                    .tracker
                    .update_step_execution(
                        record.id,
                        StepExecutionUpdate {
                            status: Some(StepStatus::Completed),
                            quality_results: checks.clone(),
                            suggestions: dispatch.suggestions.clone(),
                            error: None,
                        },
                    )
                    .await?;
                self.tracker
                    .record_step_completed(execution_id, &step.id)
                    .await?;
                if !dispatch.metrics.is_empty() {
                    self.tracker
                        .record_metrics(execution_id, dispatch.metrics)
                        .await?;
                }
                suggestions.extend(dispatch.suggestions);
                step_reports.push(StepReport {
                    step_execution_id: updated.id,
                    step_id: step.id.clone(),
                    status: StepStatus::Completed,
                    quality_results: checks.clone(),
                    error: None,
                });
                batch_checks.extend(checks);
            } else {
                let message = dispatch
                    .error
                    .unwrap_or_else(|| format!("Step '{}' failed", step.id));
                warn!(execution = %execution_id, step = %step.id, error = %message, "step failed");
                let updated = self
                    .tracker
                    .update_step_execution(record.id, StepExecutionUpdate::failed(message.clone()))
                    .await?;
                step_reports.push(StepReport {
                    step_execution_id: updated.id,
                    step_id: step.id.clone(),
                    status: StepStatus::Failed,
                    quality_results: vec![],
                    error: Some(message.clone()),
                });
                errors.push(message);
                batch_failed = true;
                if self.config.halt_on_failure {
                    break;
                }
            }
        }
        self.tracker.set_current_step(execution_id, None).await?;

        // Satisfied gates and the cycle quality score are recorded before
        // any transition decision.
        let passing: BTreeSet<String> = batch_checks
            .iter()
            .filter(|c| c.passed())
            .map(|c| c.rule_id.clone())
            .collect();
        if !passing.is_empty() {
            self.tracker
                .satisfy_quality_gates(execution_id, passing.into_iter().collect())
                .await?;
        }
        if !batch_checks.is_empty() {
            let passed = batch_checks.iter().filter(|c| c.passed()).count();
            let score = passed as f64 / batch_checks.len() as f64;
            self.tracker
                .record_metrics(
                    execution_id,
                    MetricsDelta {
                        quality_score: Some(score),
                        ..MetricsDelta::default()
                    },
                )
                .await?;
        }

        if self.config.advisory_suggestions {
            if let Some(text) = self.profile_guidance(&execution, &role.id).await {
                suggestions.push(text);
            }
        }

        let mut transitioned = false;
        let mut completed = false;
        let next_roles = self.registry.next_roles(&role.id)?;

        // Handing off (or completing) requires every step owned by the
        // current role to be completed, not just the ones this cycle ran.
        let snapshot = self.tracker.execution(execution_id).await?;
        let role_work_done = workflow
            .steps_for_role(&role)
            .into_iter()
            .all(|s| snapshot.step_completed(&s.id));

        if next_roles.is_empty() {
            if !batch_failed && role_work_done {
                self.tracker
                    .complete_execution(execution_id, MetricsDelta::default())
                    .await?;
                completed = true;
                info!(execution = %execution_id, role = %role.id, "terminal role finished; execution completed");
            }
        } else if !batch_failed && role_work_done {
            let failed_checks: Vec<&QualityCheckResult> =
                batch_checks.iter().filter(|c| !c.passed()).collect();
            if failed_checks.is_empty() {
                let target = next_roles[0].id.clone();
                let validation = self.registry.validate_transition(&snapshot, &target);
                if validation.valid {
                    let notes = format!(
                        "Completed {} step(s) as {}",
                        step_reports.len(),
                        role.name
                    );
                    self.tracker
                        .transition_role(
                            execution_id,
                            &target,
                            &notes,
                            Vec::new(),
                            "all required quality gates satisfied".to_string(),
                        )
                        .await?;
                    transitioned = true;
                } else {
                    let denial = validation
                        .denial
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "transition rejected".to_string());
                    errors.push(format!(
                        "role transition to '{}' rejected: {}",
                        target, denial
                    ));
                }
            } else {
                let failed_ids: Vec<&str> =
                    failed_checks.iter().map(|c| c.rule_id.as_str()).collect();
                errors.push(format!(
                    "quality checks failed ({}); role handoff deferred",
                    failed_ids.join(", ")
                ));
            }
        }

        self.report(
            execution_id,
            step_reports,
            errors,
            suggestions,
            transitioned,
            completed,
        )
        .await
    }

    /// Advisory guidance from the profile the execution was created for
    async fn profile_guidance(&self, execution: &Execution, role_id: &str) -> Option<String> {
        let profile_id = execution.context.variables.get(AGENT_PROFILE_VAR)?;
        match self.profiles.profile(profile_id).await {
            Ok(profile) => profile.and_then(|p| p.guidance_for(role_id).map(String::from)),
            Err(e) => {
                warn!(profile = %profile_id, error = %e, "agent profile lookup failed");
                None
            }
        }
    }

    async fn report(
        &self,
        execution_id: Uuid,
        step_reports: Vec<StepReport>,
        errors: Vec<String>,
        suggestions: Vec<String>,
        transitioned: bool,
        completed: bool,
    ) -> Result<RoleCycleReport> {
        let snapshot = self.tracker.execution(execution_id).await?;
        Ok(RoleCycleReport {
            success: errors.is_empty(),
            execution_id,
            role: snapshot.current_role.clone(),
            transitioned,
            completed,
            step_reports,
            metrics: snapshot.metrics,
            errors,
            suggestions,
            finished_at: Utc::now(),
        })
    }
}
