//! Role registry and transition validation
//!
//! The registry is the static table of roles: declared capabilities,
//! required quality gates, and allowed next roles (a directed graph, not
//! acyclic-checked). It is built once at process start, is read-only
//! thereafter, and is shared by reference with the orchestrator rather than
//! living in global singleton state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::execution::Execution;
use crate::role::{AgentProfile, Capability, Role};
use crate::{Error, Result};

/// Why a proposed role transition was rejected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TransitionDenial {
    /// The source or target role id is unknown to the registry
    InvalidRole { role_id: String },
    /// The target is not among the source role's allowed next roles
    NotAllowed { allowed: Vec<String> },
    /// Required quality gates of the current role are not yet satisfied
    GatesUnmet { missing_gates: Vec<String> },
}

impl std::fmt::Display for TransitionDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionDenial::InvalidRole { role_id } => {
                write!(f, "invalid role: {}", role_id)
            }
            TransitionDenial::NotAllowed { allowed } => {
                write!(f, "transition not allowed; allowed next roles: {}", allowed.join(", "))
            }
            TransitionDenial::GatesUnmet { missing_gates } => {
                write!(f, "quality gates not met: {}", missing_gates.join(", "))
            }
        }
    }
}

/// Structured result of validating a proposed role transition
///
/// Invalid transitions are recoverable: the caller remediates (satisfies
/// gates, picks an allowed target) and retries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionValidation {
    pub valid: bool,
    pub denial: Option<TransitionDenial>,
}

impl TransitionValidation {
    /// A passing validation
    pub fn allowed() -> Self {
        Self {
            valid: true,
            denial: None,
        }
    }

    /// A failing validation with its structured reason
    pub fn denied(denial: TransitionDenial) -> Self {
        Self {
            valid: false,
            denial: Some(denial),
        }
    }

    /// The gates still missing, when the denial is gate-related
    pub fn missing_gates(&self) -> &[String] {
        match &self.denial {
            Some(TransitionDenial::GatesUnmet { missing_gates }) => missing_gates,
            _ => &[],
        }
    }
}

/// Immutable lookup table of roles and agent profiles
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
    /// Role ids in declaration order
    order: Vec<String>,
    profiles: HashMap<String, AgentProfile>,
}

impl RoleRegistry {
    /// Build a registry from role and profile tables
    ///
    /// Duplicate role or profile ids are rejected. Edges to unregistered
    /// roles are allowed at build time (the graph may be assembled
    /// piecemeal) but logged, and they never validate as transitions.
    pub fn new(roles: Vec<Role>, profiles: Vec<AgentProfile>) -> Result<Self> {
        let mut table = HashMap::new();
        let mut order = Vec::with_capacity(roles.len());
        for role in roles {
            if table.contains_key(&role.id) {
                return Err(Error::constraint_violation(
                    "unique_role_ids",
                    format!("Duplicate role id '{}' in registry", role.id),
                ));
            }
            order.push(role.id.clone());
            table.insert(role.id.clone(), role);
        }
        for role in table.values() {
            for next in &role.next_roles {
                if !table.contains_key(next) {
                    warn!(
                        role = %role.id,
                        next_role = %next,
                        "role declares a next role that is not registered"
                    );
                }
            }
        }

        let mut profile_table = HashMap::new();
        for profile in profiles {
            if profile_table.contains_key(&profile.id) {
                return Err(Error::constraint_violation(
                    "unique_profile_ids",
                    format!("Duplicate agent profile id '{}' in registry", profile.id),
                ));
            }
            profile_table.insert(profile.id.clone(), profile);
        }

        Ok(Self {
            roles: table,
            order,
            profiles: profile_table,
        })
    }

    /// The built-in role table: planner → implementer → tester → reviewer →
    /// documenter
    ///
    /// Gives the engine a working handoff chain out of the box; deployments
    /// with their own role model construct the registry via [`Self::new`].
    pub fn builtin() -> Self {
        let roles = vec![
            Role::builder()
                .id("planner")
                .name("Planner")
                .capability(Capability::Analysis)
                .quality_gate("plan-complete")
                .next_role("implementer")
                .build()
                .expect("builtin planner role is valid"),
            Role::builder()
                .id("implementer")
                .name("Implementer")
                .capability(Capability::CodeImplementation)
                .quality_gate("lint-clean")
                .next_role("tester")
                .build()
                .expect("builtin implementer role is valid"),
            Role::builder()
                .id("tester")
                .name("Tester")
                .capability(Capability::UnitTesting)
                .quality_gate("tests-pass")
                .next_role("reviewer")
                .build()
                .expect("builtin tester role is valid"),
            Role::builder()
                .id("reviewer")
                .name("Reviewer")
                .capability(Capability::CodeReview)
                .quality_gate("review-approved")
                .next_role("documenter")
                .build()
                .expect("builtin reviewer role is valid"),
            Role::builder()
                .id("documenter")
                .name("Documenter")
                .capability(Capability::Documentation)
                .build()
                .expect("builtin documenter role is valid"),
        ];
        let profiles = vec![AgentProfile::new(
            "general".to_string(),
            "General".to_string(),
            roles.iter().map(|r| r.id.clone()).collect(),
        )
        .expect("builtin general profile is valid")];
        Self::new(roles, profiles).expect("builtin registry is valid")
    }

    /// Look up a role by id
    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }

    /// All roles in declaration order
    pub fn roles(&self) -> Vec<&Role> {
        self.order
            .iter()
            .filter_map(|id| self.roles.get(id))
            .collect()
    }

    /// Allowed next roles of a role, in declared order
    ///
    /// An empty list signals a terminal role. Unknown source ids are a
    /// not-found error; declared edges to unregistered roles are skipped.
    pub fn next_roles(&self, role_id: &str) -> Result<Vec<&Role>> {
        let role = self
            .roles
            .get(role_id)
            .ok_or_else(|| Error::not_found("Role", role_id))?;
        Ok(role
            .next_roles
            .iter()
            .filter_map(|id| self.roles.get(id))
            .collect())
    }

    /// Check whether `to` appears among `from`'s allowed next roles
    pub fn can_transition(&self, from_role_id: &str, to_role_id: &str) -> bool {
        self.roles
            .get(from_role_id)
            .map(|role| role.allows_next(to_role_id))
            .unwrap_or(false)
    }

    /// Validate a proposed transition for an execution
    ///
    /// Checks, in order: both role ids known, target reachable from the
    /// execution's current role, and every quality gate of the current role
    /// present in the execution's satisfied-gate set.
    pub fn validate_transition(
        &self,
        execution: &Execution,
        to_role_id: &str,
    ) -> TransitionValidation {
        let from_role = match self.roles.get(&execution.current_role) {
            Some(role) => role,
            None => {
                return TransitionValidation::denied(TransitionDenial::InvalidRole {
                    role_id: execution.current_role.clone(),
                })
            }
        };
        if !self.roles.contains_key(to_role_id) {
            return TransitionValidation::denied(TransitionDenial::InvalidRole {
                role_id: to_role_id.to_string(),
            });
        }
        if !from_role.allows_next(to_role_id) {
            return TransitionValidation::denied(TransitionDenial::NotAllowed {
                allowed: from_role.next_roles.clone(),
            });
        }
        let missing = execution.context.missing_gates(&from_role.quality_gates);
        if !missing.is_empty() {
            return TransitionValidation::denied(TransitionDenial::GatesUnmet {
                missing_gates: missing,
            });
        }
        TransitionValidation::allowed()
    }

    /// Roles supported by an agent profile, in the profile's declared order
    ///
    /// Used only to pick an initial role for a new execution; unknown role
    /// ids in the profile are skipped with a warning.
    pub fn roles_for_agent(&self, profile_id: &str) -> Result<Vec<&Role>> {
        let profile = self
            .profiles
            .get(profile_id)
            .ok_or_else(|| Error::not_found("AgentProfile", profile_id))?;
        Ok(profile
            .supported_roles
            .iter()
            .filter_map(|id| {
                let role = self.roles.get(id);
                if role.is_none() {
                    warn!(
                        profile = %profile_id,
                        role = %id,
                        "agent profile references an unknown role"
                    );
                }
                role
            })
            .collect())
    }

    /// Look up an agent profile by id
    pub fn agent_profile(&self, profile_id: &str) -> Option<&AgentProfile> {
        self.profiles.get(profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn two_role_registry() -> RoleRegistry {
        let roles = vec![
            Role::builder()
                .id("implementer")
                .capability(Capability::CodeImplementation)
                .quality_gate("lint-clean")
                .quality_gate("tests-pass")
                .next_role("reviewer")
                .build()
                .unwrap(),
            Role::builder()
                .id("reviewer")
                .capability(Capability::CodeReview)
                .build()
                .unwrap(),
        ];
        RoleRegistry::new(roles, vec![]).unwrap()
    }

    #[test]
    fn test_duplicate_role_ids_rejected() {
        let roles = vec![
            Role::builder()
                .id("planner")
                .capability(Capability::Analysis)
                .build()
                .unwrap(),
            Role::builder()
                .id("planner")
                .capability(Capability::Analysis)
                .build()
                .unwrap(),
        ];
        assert!(RoleRegistry::new(roles, vec![]).is_err());
    }

    #[test]
    fn test_can_transition_over_every_pair() {
        let registry = two_role_registry();
        assert!(registry.can_transition("implementer", "reviewer"));
        assert!(!registry.can_transition("implementer", "implementer"));
        assert!(!registry.can_transition("reviewer", "implementer"));
        assert!(!registry.can_transition("reviewer", "reviewer"));
        // Unknown roles never transition
        assert!(!registry.can_transition("ghost", "reviewer"));
    }

    #[test]
    fn test_next_roles_terminal_and_unknown() {
        let registry = two_role_registry();
        let next: Vec<&str> = registry
            .next_roles("implementer")
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(next, vec!["reviewer"]);

        assert!(registry.next_roles("reviewer").unwrap().is_empty());
        assert!(registry.next_roles("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn test_validate_transition_unknown_roles() {
        let registry = two_role_registry();
        let execution = Execution::new("wf", "implementer", HashMap::new());

        let validation = registry.validate_transition(&execution, "ghost");
        assert!(!validation.valid);
        assert!(matches!(
            validation.denial,
            Some(TransitionDenial::InvalidRole { .. })
        ));

        let orphan = Execution::new("wf", "ghost", HashMap::new());
        let validation = registry.validate_transition(&orphan, "reviewer");
        assert!(matches!(
            validation.denial,
            Some(TransitionDenial::InvalidRole { .. })
        ));
    }

    #[test]
    fn test_validate_transition_not_allowed_carries_requirements() {
        let registry = two_role_registry();
        let execution = Execution::new("wf", "reviewer", HashMap::new());

        let validation = registry.validate_transition(&execution, "implementer");
        assert!(!validation.valid);
        match validation.denial.unwrap() {
            TransitionDenial::NotAllowed { allowed } => assert!(allowed.is_empty()),
            other => panic!("expected NotAllowed, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_transition_gate_difference_is_exact() {
        let registry = two_role_registry();
        let mut execution = Execution::new("wf", "implementer", HashMap::new());

        let validation = registry.validate_transition(&execution, "reviewer");
        assert_eq!(
            validation.missing_gates(),
            &["lint-clean".to_string(), "tests-pass".to_string()]
        );

        execution.context.satisfy_gate("lint-clean");
        let validation = registry.validate_transition(&execution, "reviewer");
        assert_eq!(validation.missing_gates(), &["tests-pass".to_string()]);

        execution.context.satisfy_gate("tests-pass");
        // Extra satisfied gates are not reported as missing
        execution.context.satisfy_gate("unrelated-gate");
        let validation = registry.validate_transition(&execution, "reviewer");
        assert!(validation.valid);
        assert!(validation.missing_gates().is_empty());
    }

    #[test]
    fn test_roles_for_agent_preserves_profile_order() {
        let roles = vec![
            Role::builder()
                .id("planner")
                .capability(Capability::Analysis)
                .build()
                .unwrap(),
            Role::builder()
                .id("implementer")
                .capability(Capability::CodeImplementation)
                .build()
                .unwrap(),
        ];
        let profile = AgentProfile::new(
            "cursor".to_string(),
            "Cursor".to_string(),
            vec![
                "implementer".to_string(),
                "ghost".to_string(),
                "planner".to_string(),
            ],
        )
        .unwrap();
        let registry = RoleRegistry::new(roles, vec![profile]).unwrap();

        let supported: Vec<&str> = registry
            .roles_for_agent("cursor")
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(supported, vec!["implementer", "planner"]);

        assert!(registry.roles_for_agent("unknown").unwrap_err().is_not_found());
    }

    #[test]
    fn test_builtin_registry_chain() {
        let registry = RoleRegistry::builtin();
        let ids: Vec<&str> = registry.roles().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["planner", "implementer", "tester", "reviewer", "documenter"]
        );
        assert!(registry.can_transition("planner", "implementer"));
        assert!(registry.role("documenter").unwrap().is_terminal());
        assert_eq!(registry.roles_for_agent("general").unwrap().len(), 5);
    }
}
