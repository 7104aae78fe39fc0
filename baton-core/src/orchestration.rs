//! Workflow execution and role-transition engine
//!
//! This module is the heart of Baton: it owns execution lifecycle state,
//! decides when a role may hand off to the next role, dispatches step
//! actions, and aggregates metrics and quality-check results into a
//! resumable, failable process.
//!
//! # Architecture
//!
//! ```text
//! Workflow Orchestrator
//!     |
//!     +--> Role Registry        (capability / transition lookup)
//!     |
//!     +--> Step Dispatcher      (per step, by action kind)
//!     |
//!     +--> Quality Gate Evaluator (per completed step)
//!     |
//!     +--> Execution Tracker    (all state changes)
//! ```
//!
//! Scheduling is single-threaded and cooperative: steps within one
//! orchestrator invocation run strictly in order, and there is no parallel
//! step execution inside a single execution. Independent executions may run
//! concurrently; the tracker serializes writers per execution id.
//!
//! # Examples
//!
//! ```rust,no_run
//! use baton_core::config::EngineConfig;
//! use baton_core::orchestration::{
//!     orchestrator::WorkflowOrchestrator, registry::RoleRegistry,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! async fn example(
//!     workflows: Arc<dyn baton_core::orchestration::collaborators::WorkflowStore>,
//!     templates: Arc<dyn baton_core::orchestration::collaborators::TemplateEngine>,
//!     profiles: Arc<dyn baton_core::orchestration::collaborators::AgentProfileStore>,
//!     rules: Arc<dyn baton_core::orchestration::collaborators::QualityRuleSource>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(RoleRegistry::builtin());
//!     let orchestrator = WorkflowOrchestrator::connect(
//!         registry,
//!         workflows,
//!         templates,
//!         profiles,
//!         rules,
//!         EngineConfig::default(),
//!     )
//!     .await?;
//!
//!     let execution = orchestrator
//!         .create_execution("feature-delivery", Some("general"), HashMap::new())
//!         .await?;
//!     let report = orchestrator.run_role_cycle(execution.id).await?;
//!     println!("cycle success: {}", report.success);
//!     Ok(())
//! }
//! ```

pub mod collaborators;
pub mod dispatcher;
pub mod models;
pub mod orchestrator;
pub mod quality_gate;
pub mod registry;
pub mod tracker;

pub use collaborators::{AgentProfileStore, QualityRuleSource, TemplateEngine, WorkflowStore};
pub use dispatcher::{StepActionDispatcher, StepDispatchResult};
pub use models::{ExecutionMetricsReport, RoleCycleReport, StepReport};
pub use orchestrator::WorkflowOrchestrator;
pub use quality_gate::QualityGateEvaluator;
pub use registry::{RoleRegistry, TransitionDenial, TransitionValidation};
pub use tracker::ExecutionTracker;
