//! Role domain model and related types
//!
//! This module provides the core role model for the Baton engine. A role is a
//! named stage in a workflow (planner, implementer, reviewer, ...) with
//! declared capabilities, required quality gates, and the set of roles it is
//! allowed to hand off to.
//!
//! # Examples
//!
//! Creating a new role:
//!
//! ```rust
//! use baton_core::role::{Capability, Role};
//!
//! let role = Role::builder()
//!     .id("implementer")
//!     .name("Implementer")
//!     .capability(Capability::CodeImplementation)
//!     .capability(Capability::UnitTesting)
//!     .quality_gate("lint-clean")
//!     .next_role("reviewer")
//!     .build()
//!     .unwrap();
//!
//! assert!(role.has_capability(Capability::UnitTesting));
//! assert!(!role.is_terminal());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, Result};

/// A capability a role is permitted to exercise
///
/// Capabilities form a closed set; each workflow action kind maps to exactly
/// one capability, so step selection for a role is a static table lookup
/// rather than a string comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    CodeImplementation,
    CodeReview,
    UnitTesting,
    Documentation,
    Analysis,
}

impl Capability {
    /// Stable identifier used in logs and advisory output
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CodeImplementation => "code-implementation",
            Capability::CodeReview => "code-review",
            Capability::UnitTesting => "unit-testing",
            Capability::Documentation => "documentation",
            Capability::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named stage in the workflow with its handoff graph edges
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<Capability>,
    /// Quality rule identifiers that must be satisfied before this role may
    /// hand off to a next role
    pub quality_gates: Vec<String>,
    /// Roles this role is allowed to transition to, in preference order
    pub next_roles: Vec<String>,
}

impl Role {
    /// Create a new role instance with validation
    pub fn new(
        id: String,
        name: String,
        capabilities: Vec<Capability>,
        quality_gates: Vec<String>,
        next_roles: Vec<String>,
    ) -> Result<Self> {
        Self::validate_id(&id)?;
        Self::validate_capabilities(&capabilities)?;
        Ok(Self {
            id,
            name,
            capabilities,
            quality_gates,
            next_roles,
        })
    }

    /// Create a builder for constructing a Role
    pub fn builder() -> RoleBuilder {
        RoleBuilder::new()
    }

    fn validate_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::validation("Role id cannot be empty"));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::validation(
                "Role id can only contain alphanumeric characters, hyphens, and underscores",
            ));
        }
        Ok(())
    }

    fn validate_capabilities(capabilities: &[Capability]) -> Result<()> {
        if capabilities.is_empty() {
            return Err(Error::constraint_violation(
                "min_capabilities",
                "Role must declare at least one capability",
            ));
        }
        Ok(())
    }

    /// Check if the role declares a specific capability
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Check if this role may hand off to the given role
    pub fn allows_next(&self, role_id: &str) -> bool {
        self.next_roles.iter().any(|r| r == role_id)
    }

    /// A terminal role has no next roles; finishing its steps completes the
    /// execution
    pub fn is_terminal(&self) -> bool {
        self.next_roles.is_empty()
    }

    /// Check if the role requires a specific quality gate
    pub fn requires_gate(&self, gate_id: &str) -> bool {
        self.quality_gates.iter().any(|g| g == gate_id)
    }
}

/// Builder for constructing Role instances with validation
#[derive(Debug, Clone, Default)]
pub struct RoleBuilder {
    id: Option<String>,
    name: Option<String>,
    capabilities: Vec<Capability>,
    quality_gates: Vec<String>,
    next_roles: Vec<String>,
}

impl RoleBuilder {
    /// Create a new role builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role id
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the display name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a capability
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a required quality gate
    pub fn quality_gate<S: Into<String>>(mut self, gate_id: S) -> Self {
        self.quality_gates.push(gate_id.into());
        self
    }

    /// Add an allowed next role
    pub fn next_role<S: Into<String>>(mut self, role_id: S) -> Self {
        self.next_roles.push(role_id.into());
        self
    }

    /// Build the role, validating all constraints
    pub fn build(self) -> Result<Role> {
        let id = self
            .id
            .ok_or_else(|| Error::validation("Role id is required"))?;
        let name = self.name.unwrap_or_else(|| id.clone());
        Role::new(id, name, self.capabilities, self.quality_gates, self.next_roles)
    }
}

/// A named agent profile (e.g. "cursor", "general")
///
/// Profiles declare which roles an agent supports, in preference order, and
/// optional per-role advisory guidance. They are consulted only when picking
/// an initial role for an execution and when enriching advisory suggestions;
/// they never alter the transition state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    /// Role ids the agent supports, in preference order
    pub supported_roles: Vec<String>,
    /// Optional advisory guidance keyed by role id
    pub guidance: HashMap<String, String>,
}

impl AgentProfile {
    /// Create a new agent profile with validation
    pub fn new(id: String, name: String, supported_roles: Vec<String>) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(Error::validation("Agent profile id cannot be empty"));
        }
        if supported_roles.is_empty() {
            return Err(Error::constraint_violation(
                "min_supported_roles",
                "Agent profile must support at least one role",
            ));
        }
        Ok(Self {
            id,
            name,
            supported_roles,
            guidance: HashMap::new(),
        })
    }

    /// Attach advisory guidance for a role
    pub fn with_guidance<S1: Into<String>, S2: Into<String>>(mut self, role_id: S1, text: S2) -> Self {
        self.guidance.insert(role_id.into(), text.into());
        self
    }

    /// Check if the profile supports a role
    pub fn supports_role(&self, role_id: &str) -> bool {
        self.supported_roles.iter().any(|r| r == role_id)
    }

    /// Advisory guidance for a role, if any
    pub fn guidance_for(&self, role_id: &str) -> Option<&str> {
        self.guidance.get(role_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_builder() {
        let role = Role::builder()
            .id("reviewer")
            .name("Code Reviewer")
            .capability(Capability::CodeReview)
            .quality_gate("review-approved")
            .next_role("documenter")
            .build()
            .unwrap();

        assert_eq!(role.id, "reviewer");
        assert_eq!(role.name, "Code Reviewer");
        assert!(role.has_capability(Capability::CodeReview));
        assert!(!role.has_capability(Capability::UnitTesting));
        assert!(role.requires_gate("review-approved"));
        assert!(role.allows_next("documenter"));
        assert!(!role.allows_next("planner"));
        assert!(!role.is_terminal());
    }

    #[test]
    fn test_role_defaults_name_to_id() {
        let role = Role::builder()
            .id("planner")
            .capability(Capability::Analysis)
            .build()
            .unwrap();
        assert_eq!(role.name, "planner");
        assert!(role.is_terminal());
    }

    #[test]
    fn test_role_validation() {
        let missing_id = Role::builder().capability(Capability::Analysis).build();
        assert!(missing_id.is_err());

        let empty_id = Role::builder()
            .id("  ")
            .capability(Capability::Analysis)
            .build();
        assert!(empty_id.is_err());

        let bad_chars = Role::builder()
            .id("role with spaces")
            .capability(Capability::Analysis)
            .build();
        assert!(bad_chars.is_err());

        let no_capabilities = Role::builder().id("empty").build();
        assert!(matches!(
            no_capabilities.unwrap_err(),
            Error::ConstraintViolation { .. }
        ));
    }

    #[test]
    fn test_capability_serialization() {
        let json = serde_json::to_string(&Capability::CodeImplementation).unwrap();
        assert_eq!(json, "\"code-implementation\"");

        let parsed: Capability = serde_json::from_str("\"unit-testing\"").unwrap();
        assert_eq!(parsed, Capability::UnitTesting);
    }

    #[test]
    fn test_agent_profile() {
        let profile = AgentProfile::new(
            "cursor".to_string(),
            "Cursor".to_string(),
            vec!["implementer".to_string(), "reviewer".to_string()],
        )
        .unwrap()
        .with_guidance("implementer", "Prefer small, verifiable edits");

        assert!(profile.supports_role("implementer"));
        assert!(!profile.supports_role("planner"));
        assert_eq!(
            profile.guidance_for("implementer"),
            Some("Prefer small, verifiable edits")
        );
        assert!(profile.guidance_for("reviewer").is_none());
    }

    #[test]
    fn test_agent_profile_validation() {
        let empty_id = AgentProfile::new(String::new(), "X".to_string(), vec!["a".to_string()]);
        assert!(empty_id.is_err());

        let no_roles = AgentProfile::new("general".to_string(), "General".to_string(), vec![]);
        assert!(matches!(
            no_roles.unwrap_err(),
            Error::ConstraintViolation { .. }
        ));
    }
}
