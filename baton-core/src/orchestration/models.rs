//! Aggregate result types produced by the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::execution::{ExecutionMetrics, StepStatus};
use crate::quality::QualityCheckResult;

/// Point-in-time metrics summary for one execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionMetricsReport {
    /// Step execution records created so far
    pub total_steps: usize,
    /// Step executions that reached completed status
    pub completed_steps: usize,
    /// completed / total, 0.0 when no steps have been recorded yet
    pub success_rate: f64,
    /// Mean wall-clock duration of completed steps, milliseconds
    pub average_step_time_ms: f64,
    pub quality_score: f64,
    /// Role handoffs recorded on the execution
    pub role_transitions: usize,
}

/// Outcome of one step within a role cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub step_execution_id: Uuid,
    pub step_id: String,
    pub status: StepStatus,
    pub quality_results: Vec<QualityCheckResult>,
    pub error: Option<String>,
}

impl StepReport {
    /// Whether the step reached completed status
    pub fn succeeded(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// Aggregate result of one orchestrator invocation
///
/// `success` is the whole-batch flag: it is false whenever any step or the
/// role transition failed, even though the remaining steps of the batch
/// still ran and their results are retained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleCycleReport {
    pub success: bool,
    pub execution_id: Uuid,
    /// Current role after the cycle (the handoff target when one occurred)
    pub role: String,
    /// True when the cycle ended in a role handoff
    pub transitioned: bool,
    /// True when the cycle completed the execution
    pub completed: bool,
    pub step_reports: Vec<StepReport>,
    pub metrics: ExecutionMetrics,
    /// Error messages collected across the batch; non-empty iff not success
    pub errors: Vec<String>,
    /// Advisory suggestions collected from handlers and profiles
    pub suggestions: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

impl RoleCycleReport {
    /// Step ids that completed during this cycle
    pub fn completed_step_ids(&self) -> Vec<&str> {
        self.step_reports
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| r.step_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_report_succeeded() {
        let report = StepReport {
            step_execution_id: Uuid::new_v4(),
            step_id: "s1".to_string(),
            status: StepStatus::Completed,
            quality_results: vec![],
            error: None,
        };
        assert!(report.succeeded());

        let failed = StepReport {
            status: StepStatus::Failed,
            error: Some("boom".to_string()),
            ..report
        };
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_cycle_report_completed_step_ids() {
        let ok = StepReport {
            step_execution_id: Uuid::new_v4(),
            step_id: "s1".to_string(),
            status: StepStatus::Completed,
            quality_results: vec![],
            error: None,
        };
        let failed = StepReport {
            step_execution_id: Uuid::new_v4(),
            step_id: "s2".to_string(),
            status: StepStatus::Failed,
            quality_results: vec![],
            error: Some("boom".to_string()),
        };
        let report = RoleCycleReport {
            success: false,
            execution_id: Uuid::new_v4(),
            role: "implementer".to_string(),
            transitioned: false,
            completed: false,
            step_reports: vec![ok, failed],
            metrics: ExecutionMetrics::default(),
            errors: vec!["step 's2' failed: boom".to_string()],
            suggestions: vec![],
            finished_at: Utc::now(),
        };
        assert_eq!(report.completed_step_ids(), vec!["s1"]);
    }
}
