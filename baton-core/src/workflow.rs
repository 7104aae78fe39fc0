//! Workflow definition domain model
//!
//! A workflow is an ordered set of steps plus workflow-level quality checks,
//! independent of any particular execution. Each step carries a closed
//! action kind that maps onto exactly one role capability; the orchestrator
//! uses that mapping to select the steps a role is responsible for.
//!
//! # Examples
//!
//! ```rust
//! use baton_core::workflow::{ActionKind, WorkflowDefinition, WorkflowStep};
//!
//! let workflow = WorkflowDefinition::builder()
//!     .id("feature-delivery")
//!     .name("Feature Delivery")
//!     .step(
//!         WorkflowStep::builder()
//!             .id("scaffold")
//!             .name("Scaffold module")
//!             .action(ActionKind::Create)
//!             .order(1)
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(workflow.steps.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::role::{Capability, Role};
use crate::{Error, Result};

/// The closed set of step action kinds
///
/// Unrecognized kinds are unrepresentable: a definition naming an action
/// outside this set is rejected when it is deserialized or built, not at
/// dispatch time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Modify,
    Validate,
    Test,
    Document,
    Analyze,
}

impl ActionKind {
    /// Stable identifier used in logs and generated content
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Modify => "modify",
            ActionKind::Validate => "validate",
            ActionKind::Test => "test",
            ActionKind::Document => "document",
            ActionKind::Analyze => "analyze",
        }
    }

    /// The fixed action-to-capability table
    ///
    /// A role owns a step exactly when it declares the capability this
    /// returns for the step's action kind.
    pub fn required_capability(&self) -> Capability {
        match self {
            ActionKind::Create | ActionKind::Modify => Capability::CodeImplementation,
            ActionKind::Validate => Capability::CodeReview,
            ActionKind::Test => Capability::UnitTesting,
            ActionKind::Document => Capability::Documentation,
            ActionKind::Analyze => Capability::Analysis,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work within a workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStep {
    pub id: String,
    pub name: String,
    pub action: ActionKind,
    /// Optional reference to a template rendered when the step produces
    /// content
    pub template: Option<String>,
    /// Modification-rule identifiers applied by modify-kind steps
    pub modification_rules: Vec<String>,
    /// Explicit order index used for sequencing within a role's step subset
    pub order: u32,
}

impl WorkflowStep {
    /// Create a builder for constructing a WorkflowStep
    pub fn builder() -> WorkflowStepBuilder {
        WorkflowStepBuilder::new()
    }

    /// The capability a role must declare to own this step
    pub fn required_capability(&self) -> Capability {
        self.action.required_capability()
    }
}

/// Builder for constructing WorkflowStep instances with validation
#[derive(Debug, Clone, Default)]
pub struct WorkflowStepBuilder {
    id: Option<String>,
    name: Option<String>,
    action: Option<ActionKind>,
    template: Option<String>,
    modification_rules: Vec<String>,
    order: Option<u32>,
}

impl WorkflowStepBuilder {
    /// Create a new step builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step id
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the step name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the action kind
    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = Some(action);
        self
    }

    /// Reference a template for content-producing steps
    pub fn template<S: Into<String>>(mut self, template_id: S) -> Self {
        self.template = Some(template_id.into());
        self
    }

    /// Add a modification rule identifier
    pub fn modification_rule<S: Into<String>>(mut self, rule_id: S) -> Self {
        self.modification_rules.push(rule_id.into());
        self
    }

    /// Set the explicit order index
    pub fn order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Build the step, validating all constraints
    pub fn build(self) -> Result<WorkflowStep> {
        let id = self
            .id
            .ok_or_else(|| Error::validation("Workflow step id is required"))?;
        if id.trim().is_empty() {
            return Err(Error::validation("Workflow step id cannot be empty"));
        }
        let action = self
            .action
            .ok_or_else(|| Error::validation("Workflow step action kind is required"))?;
        Ok(WorkflowStep {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            action,
            template: self.template,
            modification_rules: self.modification_rules,
            order: self.order.unwrap_or(0),
        })
    }
}

/// An ordered set of steps plus workflow-level quality checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    /// Workflow-level quality-check identifiers
    pub quality_checks: Vec<String>,
}

impl WorkflowDefinition {
    /// Create a new workflow definition with validation
    pub fn new(
        id: String,
        name: String,
        description: String,
        steps: Vec<WorkflowStep>,
        quality_checks: Vec<String>,
    ) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(Error::validation("Workflow id cannot be empty"));
        }
        if steps.is_empty() {
            return Err(Error::constraint_violation(
                "min_steps",
                "Workflow must contain at least one step",
            ));
        }
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(Error::constraint_violation(
                    "unique_step_ids",
                    format!("Duplicate step id '{}' in workflow", step.id),
                ));
            }
        }
        Ok(Self {
            id,
            name,
            description,
            steps,
            quality_checks,
        })
    }

    /// Create a builder for constructing a WorkflowDefinition
    pub fn builder() -> WorkflowDefinitionBuilder {
        WorkflowDefinitionBuilder::new()
    }

    /// Look up a step by id
    pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// The subset of steps owned by a role, ascending by order index
    ///
    /// A step belongs to a role exactly when the role declares the
    /// capability required by the step's action kind.
    pub fn steps_for_role(&self, role: &Role) -> Vec<&WorkflowStep> {
        let mut selected: Vec<&WorkflowStep> = self
            .steps
            .iter()
            .filter(|s| role.has_capability(s.required_capability()))
            .collect();
        selected.sort_by_key(|s| s.order);
        selected
    }
}

/// Builder for constructing WorkflowDefinition instances with validation
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefinitionBuilder {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    steps: Vec<WorkflowStep>,
    quality_checks: Vec<String>,
}

impl WorkflowDefinitionBuilder {
    /// Create a new workflow builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow id
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the display name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step
    pub fn step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a workflow-level quality-check identifier
    pub fn quality_check<S: Into<String>>(mut self, check_id: S) -> Self {
        self.quality_checks.push(check_id.into());
        self
    }

    /// Build the workflow, validating all constraints
    pub fn build(self) -> Result<WorkflowDefinition> {
        let id = self
            .id
            .ok_or_else(|| Error::validation("Workflow id is required"))?;
        let name = self.name.unwrap_or_else(|| id.clone());
        WorkflowDefinition::new(
            id,
            name,
            self.description.unwrap_or_default(),
            self.steps,
            self.quality_checks,
        )
    }
}
