//! Execution domain model and related types
//!
//! An execution is one stateful run of a workflow, tracked from creation to
//! a terminal status. It is the central mutable aggregate of the engine:
//! status, completed steps, per-step records, metrics, and the role-handoff
//! history all live here. Executions are mutated exclusively through the
//! [`crate::orchestration::tracker::ExecutionTracker`] and are never
//! deleted, only transitioned to a terminal status.
//!
//! # Examples
//!
//! ```rust
//! use baton_core::execution::Execution;
//! use std::collections::HashMap;
//!
//! let mut execution = Execution::new("feature-delivery", "planner", HashMap::new());
//! execution.pause("waiting for design approval").unwrap();
//! execution.resume().unwrap();
//! assert!(execution.status.is_active());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::quality::QualityCheckResult;
use crate::{Error, Result};

/// Lifecycle status of an execution
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Paused,
    Completed,
    Failed,
}

impl ExecutionStatus {
    /// Completed and failed executions accept no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }

    /// Running or paused
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Stable identifier used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Paused => "paused",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded cause of a failed execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionFailure {
    pub reason: String,
    pub detail: Option<String>,
    pub failed_at: DateTime<Utc>,
}

/// Typed per-concern execution context
///
/// The satisfied-gate set is append-only: once a gate id is recorded it
/// stays satisfied for the lifetime of the execution, so re-running a role's
/// steps can upgrade a previously failing gate without ever revoking one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionContext {
    /// Variables available to step handlers and template rendering
    pub variables: HashMap<String, String>,
    /// Quality gate identifiers satisfied so far
    pub quality_gates: BTreeSet<String>,
    /// Decisions accumulated across role handoffs
    pub decisions: Vec<String>,
    /// Reason recorded while the execution is paused
    pub pause_reason: Option<String>,
    /// Populated when the execution fails
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionContext {
    /// Create a context carrying the given variables
    pub fn with_variables(variables: HashMap<String, String>) -> Self {
        Self {
            variables,
            ..Self::default()
        }
    }

    /// Record a satisfied quality gate
    pub fn satisfy_gate<S: Into<String>>(&mut self, gate_id: S) {
        self.quality_gates.insert(gate_id.into());
    }

    /// Check whether a gate has been satisfied
    pub fn gate_satisfied(&self, gate_id: &str) -> bool {
        self.quality_gates.contains(gate_id)
    }

    /// The subset of `required` gates not yet satisfied, in declaration order
    pub fn missing_gates(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|g| !self.quality_gates.contains(*g))
            .cloned()
            .collect()
    }
}

/// Cumulative metrics for one execution
///
/// Counters never decrease; gauges are overwritten when a delta provides
/// them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionMetrics {
    pub files_created: u32,
    pub files_modified: u32,
    pub tests_written: u32,
    pub coverage: f64,
    pub quality_score: f64,
}

impl ExecutionMetrics {
    /// Fold a delta into the cumulative metrics
    pub fn absorb(&mut self, delta: &MetricsDelta) {
        self.files_created = self.files_created.saturating_add(delta.files_created);
        self.files_modified = self.files_modified.saturating_add(delta.files_modified);
        self.tests_written = self.tests_written.saturating_add(delta.tests_written);
        if let Some(coverage) = delta.coverage {
            self.coverage = coverage;
        }
        if let Some(quality_score) = delta.quality_score {
            self.quality_score = quality_score;
        }
    }
}

/// Metric changes reported by a single step dispatch or completion call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsDelta {
    pub files_created: u32,
    pub files_modified: u32,
    pub tests_written: u32,
    pub coverage: Option<f64>,
    pub quality_score: Option<f64>,
}

impl MetricsDelta {
    /// True when the delta carries no counter increments and no gauge updates
    pub fn is_empty(&self) -> bool {
        self.files_created == 0
            && self.files_modified == 0
            && self.tests_written == 0
            && self.coverage.is_none()
            && self.quality_score.is_none()
    }
}

/// Immutable record of one role handoff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleTransition {
    pub from_role: String,
    pub to_role: String,
    pub transitioned_at: DateTime<Utc>,
    pub handoff_notes: String,
    pub decisions: Vec<String>,
    pub rationale: String,
}

/// One stateful run of a workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: String,
    pub current_role: String,
    pub status: ExecutionStatus,
    /// Step ids completed so far, in completion order
    pub completed_steps: Vec<String>,
    pub current_step: Option<String>,
    pub context: ExecutionContext,
    pub metrics: ExecutionMetrics,
    /// Role handoffs, oldest first; append-only
    pub role_history: Vec<RoleTransition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Execution {
    /// Create a new running execution
    pub fn new<S1, S2>(workflow_id: S1, initial_role: S2, variables: HashMap<String, String>) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workflow_id: workflow_id.into(),
            current_role: initial_role.into(),
            status: ExecutionStatus::Running,
            completed_steps: Vec::new(),
            current_step: None,
            context: ExecutionContext::with_variables(variables),
            metrics: ExecutionMetrics::default(),
            role_history: Vec::new(),
            created_at: now,
            updated_at: now,
            started_at: now,
            completed_at: None,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Reject mutation of completed or failed executions
    ///
    /// The in-memory store would happily mutate terminal records, so the
    /// guard lives here and every mutator calls it first.
    pub fn ensure_active(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::terminal_execution(
                self.id.to_string(),
                self.status.as_str(),
            ));
        }
        Ok(())
    }

    /// Pause a running execution, recording the reason
    pub fn pause<S: Into<String>>(&mut self, reason: S) -> Result<()> {
        self.ensure_active()?;
        if self.status != ExecutionStatus::Running {
            return Err(Error::state_transition(
                "Only a running execution can be paused",
            ));
        }
        self.status = ExecutionStatus::Paused;
        self.context.pause_reason = Some(reason.into());
        self.touch();
        Ok(())
    }

    /// Resume a paused execution, clearing the pause reason
    pub fn resume(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.status != ExecutionStatus::Paused {
            return Err(Error::state_transition(
                "Only a paused execution can be resumed",
            ));
        }
        self.status = ExecutionStatus::Running;
        self.context.pause_reason = None;
        self.touch();
        Ok(())
    }

    /// Complete the execution, folding in final metrics
    pub fn complete(&mut self, final_metrics: MetricsDelta) -> Result<()> {
        self.ensure_active()?;
        self.status = ExecutionStatus::Completed;
        self.metrics.absorb(&final_metrics);
        self.current_step = None;
        self.completed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Fail the execution, recording the cause in context
    pub fn fail<S: Into<String>>(&mut self, reason: S, detail: Option<String>) -> Result<()> {
        self.ensure_active()?;
        self.status = ExecutionStatus::Failed;
        self.context.failure = Some(ExecutionFailure {
            reason: reason.into(),
            detail,
            failed_at: Utc::now(),
        });
        self.completed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Append exactly one role transition and move to the target role
    ///
    /// Performs no reachability or gate validation; callers validate through
    /// the role registry first.
    pub fn record_transition<S1, S2>(
        &mut self,
        to_role: S1,
        handoff_notes: S2,
        decisions: Vec<String>,
        rationale: String,
    ) -> Result<&RoleTransition>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.ensure_active()?;
        let to_role = to_role.into();
        let transition = RoleTransition {
            from_role: self.current_role.clone(),
            to_role: to_role.clone(),
            transitioned_at: Utc::now(),
            handoff_notes: handoff_notes.into(),
            decisions: decisions.clone(),
            rationale,
        };
        self.context.decisions.extend(decisions);
        self.role_history.push(transition);
        self.current_role = to_role;
        self.touch();
        Ok(self.role_history.last().expect("transition just appended"))
    }

    /// Record a completed step id (idempotent)
    pub fn mark_step_completed<S: Into<String>>(&mut self, step_id: S) -> Result<()> {
        self.ensure_active()?;
        let step_id = step_id.into();
        if !self.completed_steps.contains(&step_id) {
            self.completed_steps.push(step_id);
        }
        self.touch();
        Ok(())
    }

    /// Check whether a step already completed in an earlier cycle
    pub fn step_completed(&self, step_id: &str) -> bool {
        self.completed_steps.iter().any(|s| s == step_id)
    }
}

/// Lifecycle status of one step attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    /// Stable identifier used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record per step attempt within an execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepExecution {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub step_id: String,
    pub role_id: String,
    pub status: StepStatus,
    /// Stamped exactly once, when the step first moves to running
    pub started_at: Option<DateTime<Utc>>,
    /// Stamped exactly once, when the step first reaches a terminal status
    pub completed_at: Option<DateTime<Utc>>,
    pub quality_results: Vec<QualityCheckResult>,
    /// AI-generated advisory suggestions; never consulted by gate logic
    pub suggestions: Vec<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StepExecution {
    /// Create a pending step record
    pub fn new<S1, S2>(execution_id: Uuid, step_id: S1, role_id: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            step_id: step_id.into(),
            role_id: role_id.into(),
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            quality_results: Vec::new(),
            suggestions: Vec::new(),
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update, enforcing stamp-once timestamp semantics
    pub fn apply_update(&mut self, update: StepExecutionUpdate) {
        if let Some(status) = update.status {
            self.status = status;
            match status {
                StepStatus::Running => {
                    if self.started_at.is_none() {
                        self.started_at = Some(Utc::now());
                    }
                }
                StepStatus::Completed | StepStatus::Failed => {
                    if self.completed_at.is_none() {
                        self.completed_at = Some(Utc::now());
                    }
                }
                StepStatus::Pending => {}
            }
        }
        self.quality_results.extend(update.quality_results);
        self.suggestions.extend(update.suggestions);
        if update.error.is_some() {
            self.error = update.error;
        }
    }

    /// Wall-clock duration of a completed step, if both stamps exist
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => {
                Some(completed.signed_duration_since(started).num_milliseconds())
            }
            _ => None,
        }
    }
}

/// Partial update applied to a step execution through the tracker
#[derive(Debug, Clone, Default)]
pub struct StepExecutionUpdate {
    pub status: Option<StepStatus>,
    pub quality_results: Vec<QualityCheckResult>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

impl StepExecutionUpdate {
    /// Update that only changes status
    pub fn status(status: StepStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update that marks the step failed with a captured message
    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            status: Some(StepStatus::Failed),
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{CheckStatus, QualityCheckResult};

    fn check(rule_id: &str, status: CheckStatus) -> QualityCheckResult {
        QualityCheckResult {
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            status,
            message: String::new(),
            suggestions: vec![],
        }
    }

    #[test]
    fn test_new_execution_invariants() {
        let mut variables = HashMap::new();
        variables.insert("project".to_string(), "baton".to_string());
        let execution = Execution::new("wf-1", "planner", variables);

        assert_eq!(execution.status, ExecutionStatus::Running);
        assert!(execution.completed_steps.is_empty());
        assert!(execution.role_history.is_empty());
        assert_eq!(execution.metrics, ExecutionMetrics::default());
        assert_eq!(execution.created_at, execution.started_at);
        assert_eq!(execution.context.variables.get("project").unwrap(), "baton");
        assert!(execution.context.quality_gates.is_empty());
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let mut execution = Execution::new("wf-1", "planner", HashMap::new());
        execution.mark_step_completed("s1").unwrap();
        let metrics_before = execution.metrics;

        execution.pause("waiting on review").unwrap();
        assert_eq!(execution.status, ExecutionStatus::Paused);
        assert_eq!(
            execution.context.pause_reason.as_deref(),
            Some("waiting on review")
        );

        // Pausing twice is a state error
        assert!(execution.pause("again").is_err());

        execution.resume().unwrap();
        assert_eq!(execution.status, ExecutionStatus::Running);
        assert!(execution.context.pause_reason.is_none());
        assert_eq!(execution.completed_steps, vec!["s1".to_string()]);
        assert_eq!(execution.metrics, metrics_before);

        // Resuming a running execution is a state error
        assert!(execution.resume().is_err());
    }

    #[test]
    fn test_terminal_rejects_all_mutation() {
        let mut execution = Execution::new("wf-1", "planner", HashMap::new());
        execution.complete(MetricsDelta::default()).unwrap();

        assert!(execution.pause("x").unwrap_err().is_terminal_execution());
        assert!(execution.resume().unwrap_err().is_terminal_execution());
        assert!(execution
            .record_transition("implementer", "", vec![], String::new())
            .unwrap_err()
            .is_terminal_execution());
        assert!(execution
            .mark_step_completed("s1")
            .unwrap_err()
            .is_terminal_execution());
        assert!(execution
            .fail("late failure", None)
            .unwrap_err()
            .is_terminal_execution());
    }

    #[test]
    fn test_record_transition_appends_exactly_one() {
        let mut execution = Execution::new("wf-1", "planner", HashMap::new());
        execution
            .record_transition(
                "implementer",
                "plan approved",
                vec!["use actor model".to_string()],
                "all planner gates satisfied".to_string(),
            )
            .unwrap();

        assert_eq!(execution.role_history.len(), 1);
        assert_eq!(execution.current_role, "implementer");
        let transition = &execution.role_history[0];
        assert_eq!(transition.from_role, "planner");
        assert_eq!(transition.to_role, "implementer");
        assert_eq!(
            execution.context.decisions,
            vec!["use actor model".to_string()]
        );

        execution
            .record_transition("reviewer", "", vec![], String::new())
            .unwrap();
        assert_eq!(execution.role_history.len(), 2);
        assert_eq!(execution.current_role, "reviewer");
    }

    #[test]
    fn test_fail_records_cause() {
        let mut execution = Execution::new("wf-1", "planner", HashMap::new());
        execution
            .fail("step dispatch failed", Some("template not found".to_string()))
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Failed);
        let failure = execution.context.failure.as_ref().unwrap();
        assert_eq!(failure.reason, "step dispatch failed");
        assert_eq!(failure.detail.as_deref(), Some("template not found"));
        assert!(execution.completed_at.is_some());
    }

    #[test]
    fn test_metrics_absorb() {
        let mut metrics = ExecutionMetrics::default();
        metrics.absorb(&MetricsDelta {
            files_created: 2,
            tests_written: 1,
            ..MetricsDelta::default()
        });
        metrics.absorb(&MetricsDelta {
            files_modified: 3,
            coverage: Some(0.8),
            quality_score: Some(0.9),
            ..MetricsDelta::default()
        });

        assert_eq!(metrics.files_created, 2);
        assert_eq!(metrics.files_modified, 3);
        assert_eq!(metrics.tests_written, 1);
        assert!((metrics.coverage - 0.8).abs() < f64::EPSILON);
        assert!((metrics.quality_score - 0.9).abs() < f64::EPSILON);

        // A delta without gauges leaves them untouched
        metrics.absorb(&MetricsDelta {
            files_created: 1,
            ..MetricsDelta::default()
        });
        assert!((metrics.coverage - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_gates_is_exact_set_difference() {
        let mut context = ExecutionContext::default();
        context.satisfy_gate("lint-clean");
        context.satisfy_gate("tests-pass");

        let required = vec![
            "lint-clean".to_string(),
            "review-approved".to_string(),
            "tests-pass".to_string(),
            "docs-present".to_string(),
        ];
        assert_eq!(
            context.missing_gates(&required),
            vec!["review-approved".to_string(), "docs-present".to_string()]
        );
        assert!(context.missing_gates(&[]).is_empty());
    }

    #[test]
    fn test_step_execution_stamps_once() {
        let execution_id = Uuid::new_v4();
        let mut step = StepExecution::new(execution_id, "s1", "implementer");
        assert_eq!(step.status, StepStatus::Pending);
        assert!(step.started_at.is_none());

        step.apply_update(StepExecutionUpdate::status(StepStatus::Running));
        let started = step.started_at.unwrap();

        // Re-applying running does not move the stamp
        step.apply_update(StepExecutionUpdate::status(StepStatus::Running));
        assert_eq!(step.started_at.unwrap(), started);

        step.apply_update(StepExecutionUpdate::status(StepStatus::Completed));
        let completed = step.completed_at.unwrap();
        step.apply_update(StepExecutionUpdate::status(StepStatus::Completed));
        assert_eq!(step.completed_at.unwrap(), completed);

        assert!(step.duration_ms().unwrap() >= 0);
    }

    #[test]
    fn test_step_execution_update_accumulates() {
        let mut step = StepExecution::new(Uuid::new_v4(), "s1", "reviewer");
        step.apply_update(StepExecutionUpdate {
            status: Some(StepStatus::Running),
            quality_results: vec![check("r1", CheckStatus::Pass)],
            suggestions: vec!["consider splitting the module".to_string()],
            error: None,
        });
        step.apply_update(StepExecutionUpdate {
            quality_results: vec![check("r2", CheckStatus::Fail)],
            ..StepExecutionUpdate::default()
        });

        assert_eq!(step.quality_results.len(), 2);
        assert_eq!(step.suggestions.len(), 1);

        step.apply_update(StepExecutionUpdate::failed("handler panicked"));
        assert_eq!(step.status, StepStatus::Failed);
        assert_eq!(step.error.as_deref(), Some("handler panicked"));
    }
}
