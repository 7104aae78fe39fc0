//! Execution state tracking
//!
//! The tracker owns the mutable state of every workflow run in the process:
//! execution records, their step executions, metrics, and role-transition
//! history. All mutation flows through its per-id methods; each execution is
//! guarded by its own lock, so concurrent callers updating the same
//! execution are serialized (single writer per key) while independent
//! executions proceed in parallel.
//!
//! Operations on unknown ids return [`Error::NotFound`]; mutations of
//! completed or failed executions are rejected with
//! [`Error::TerminalExecution`], since the underlying map would not itself
//! prevent them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::execution::{
    Execution, ExecutionMetrics, MetricsDelta, StepExecution, StepExecutionUpdate, StepStatus,
};
use crate::orchestration::models::ExecutionMetricsReport;
use crate::{Error, Result};

/// One execution together with its step records
#[derive(Debug)]
struct ExecutionEntry {
    execution: Execution,
    steps: Vec<StepExecution>,
}

/// In-memory tracker for all executions of this process
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    entries: RwLock<HashMap<Uuid, Arc<Mutex<ExecutionEntry>>>>,
    /// Step-execution id -> owning execution id
    step_index: RwLock<HashMap<Uuid, Uuid>>,
}

impl ExecutionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, execution_id: Uuid) -> Result<Arc<Mutex<ExecutionEntry>>> {
        self.entries
            .read()
            .await
            .get(&execution_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Execution", execution_id.to_string()))
    }

    /// Create a new running execution
    ///
    /// The returned snapshot always has status running, no completed steps,
    /// no role history, and zeroed metrics, regardless of input variables.
    pub async fn create_execution(
        &self,
        workflow_id: &str,
        initial_role: &str,
        variables: HashMap<String, String>,
    ) -> Result<Execution> {
        let execution = Execution::new(workflow_id, initial_role, variables);
        let snapshot = execution.clone();
        self.entries.write().await.insert(
            execution.id,
            Arc::new(Mutex::new(ExecutionEntry {
                execution,
                steps: Vec::new(),
            })),
        );
        info!(
            execution = %snapshot.id,
            workflow = %workflow_id,
            role = %initial_role,
            "created execution"
        );
        Ok(snapshot)
    }

    /// Snapshot of an execution
    pub async fn execution(&self, execution_id: Uuid) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let guard = entry.lock().await;
        Ok(guard.execution.clone())
    }

    /// Snapshots of all tracked executions
    pub async fn executions(&self) -> Vec<Execution> {
        let entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        let mut executions = Vec::with_capacity(entries.len());
        for entry in entries {
            executions.push(entry.lock().await.execution.clone());
        }
        executions
    }

    /// Snapshot of an execution's step records, oldest first
    pub async fn step_executions(&self, execution_id: Uuid) -> Result<Vec<StepExecution>> {
        let entry = self.entry(execution_id).await?;
        let guard = entry.lock().await;
        Ok(guard.steps.clone())
    }

    /// Add a pending step execution record
    pub async fn add_step_execution(
        &self,
        execution_id: Uuid,
        step_id: &str,
        role_id: &str,
    ) -> Result<StepExecution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.ensure_active()?;

        let step = StepExecution::new(execution_id, step_id, role_id);
        let snapshot = step.clone();
        self.step_index.write().await.insert(step.id, execution_id);
        guard.steps.push(step);
        debug!(
            execution = %execution_id,
            step = %step_id,
            role = %role_id,
            "added step execution"
        );
        Ok(snapshot)
    }

    /// Apply a partial update to a step execution
    ///
    /// Status changes stamp started/completed timestamps exactly once;
    /// quality results and suggestions accumulate.
    pub async fn update_step_execution(
        &self,
        step_execution_id: Uuid,
        update: StepExecutionUpdate,
    ) -> Result<StepExecution> {
        let execution_id = self
            .step_index
            .read()
            .await
            .get(&step_execution_id)
            .copied()
            .ok_or_else(|| Error::not_found("StepExecution", step_execution_id.to_string()))?;

        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.ensure_active()?;
        let step = guard
            .steps
            .iter_mut()
            .find(|s| s.id == step_execution_id)
            .ok_or_else(|| Error::not_found("StepExecution", step_execution_id.to_string()))?;
        step.apply_update(update);
        Ok(step.clone())
    }

    /// Append a role transition and move the execution to the target role
    ///
    /// Performs no reachability or gate validation; callers validate through
    /// the role registry first.
    pub async fn transition_role(
        &self,
        execution_id: Uuid,
        to_role: &str,
        handoff_notes: &str,
        decisions: Vec<String>,
        rationale: String,
    ) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        let from_role = guard.execution.current_role.clone();
        guard
            .execution
            .record_transition(to_role, handoff_notes, decisions, rationale)?;
        info!(
            execution = %execution_id,
            from = %from_role,
            to = %to_role,
            "role transition recorded"
        );
        Ok(guard.execution.clone())
    }

    /// Pause a running execution
    pub async fn pause_execution(&self, execution_id: Uuid, reason: &str) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.pause(reason)?;
        info!(execution = %execution_id, reason = %reason, "execution paused");
        Ok(guard.execution.clone())
    }

    /// Resume a paused execution
    pub async fn resume_execution(&self, execution_id: Uuid) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.resume()?;
        info!(execution = %execution_id, "execution resumed");
        Ok(guard.execution.clone())
    }

    /// Complete an execution (terminal), folding in final metrics
    pub async fn complete_execution(
        &self,
        execution_id: Uuid,
        final_metrics: MetricsDelta,
    ) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.complete(final_metrics)?;
        info!(execution = %execution_id, "execution completed");
        Ok(guard.execution.clone())
    }

    /// Fail an execution (terminal), recording the cause
    pub async fn fail_execution(
        &self,
        execution_id: Uuid,
        reason: &str,
        detail: Option<String>,
    ) -> Result<Execution> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.fail(reason, detail)?;
        info!(execution = %execution_id, reason = %reason, "execution failed");
        Ok(guard.execution.clone())
    }

    /// Fold a metrics delta into the execution's cumulative metrics
    pub async fn record_metrics(
        &self,
        execution_id: Uuid,
        delta: MetricsDelta,
    ) -> Result<ExecutionMetrics> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.ensure_active()?;
        guard.execution.metrics.absorb(&delta);
        Ok(guard.execution.metrics)
    }

    /// Record a completed workflow step id on the execution
    pub async fn record_step_completed(&self, execution_id: Uuid, step_id: &str) -> Result<()> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.mark_step_completed(step_id)
    }

    /// Add satisfied quality gate ids to the execution context
    pub async fn satisfy_quality_gates(
        &self,
        execution_id: Uuid,
        gate_ids: Vec<String>,
    ) -> Result<()> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.ensure_active()?;
        for gate_id in gate_ids {
            guard.execution.context.satisfy_gate(gate_id);
        }
        Ok(())
    }

    /// Set or clear the execution's current step marker
    pub async fn set_current_step(
        &self,
        execution_id: Uuid,
        step_id: Option<String>,
    ) -> Result<()> {
        let entry = self.entry(execution_id).await?;
        let mut guard = entry.lock().await;
        guard.execution.ensure_active()?;
        guard.execution.current_step = step_id;
        Ok(())
    }

    /// Metrics summary for an execution
    ///
    /// Success rate is completed step executions over total step executions
    /// (0 when none exist); average step time considers completed steps
    /// only.
    pub async fn execution_metrics(&self, execution_id: Uuid) -> Result<ExecutionMetricsReport> {
        let entry = self.entry(execution_id).await?;
        let guard = entry.lock().await;

        let total_steps = guard.steps.len();
        let completed: Vec<&StepExecution> = guard
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .collect();
        let success_rate = if total_steps == 0 {
            0.0
        } else {
            completed.len() as f64 / total_steps as f64
        };
        let durations: Vec<i64> = completed.iter().filter_map(|s| s.duration_ms()).collect();
        let average_step_time_ms = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<i64>() as f64 / durations.len() as f64
        };

        Ok(ExecutionMetricsReport {
            total_steps,
            completed_steps: completed.len(),
            success_rate,
            average_step_time_ms,
            quality_score: guard.execution.metrics.quality_score,
            role_transitions: guard.execution.role_history.len(),
        })
    }
}
