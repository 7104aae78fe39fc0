//! Quality rule and check-result types
//!
//! Quality rules are pattern-based checks supplied by an external rule
//! source. The gate evaluator runs them against step artifacts; each rule
//! yields exactly one [`QualityCheckResult`] per evaluated step. Passing
//! results feed the execution's satisfied-gate set, which in turn gates role
//! transitions.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Severity of a quality rule
///
/// `Error` and `Warning` rules are lint-style: a pattern hit fails the
/// check. `Info` rules only annotate; they always pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warning,
    Info,
}

impl RuleSeverity {
    /// Whether a pattern hit should fail the check
    pub fn is_lint(&self) -> bool {
        matches!(self, RuleSeverity::Error | RuleSeverity::Warning)
    }
}

/// A pattern-based quality rule supplied by the rule source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityRule {
    pub id: String,
    pub name: String,
    /// Regular expression matched against step artifacts
    pub pattern: String,
    pub severity: RuleSeverity,
}

impl QualityRule {
    /// Create a new quality rule with validation
    pub fn new<S1, S2, S3>(id: S1, name: S2, pattern: S3, severity: RuleSeverity) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let id = id.into();
        let pattern = pattern.into();
        if id.trim().is_empty() {
            return Err(Error::validation("Quality rule id cannot be empty"));
        }
        if pattern.is_empty() {
            return Err(Error::validation("Quality rule pattern cannot be empty"));
        }
        Ok(Self {
            id,
            name: name.into(),
            pattern,
            severity,
        })
    }
}

/// Outcome of a single rule evaluation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Result of evaluating one quality rule against one step artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityCheckResult {
    pub rule_id: String,
    pub rule_name: String,
    pub status: CheckStatus,
    pub message: String,
    /// Advisory remediation hints; not used in gate logic
    pub suggestions: Vec<String>,
}

impl QualityCheckResult {
    /// Check if the result passed
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_validation() {
        assert!(QualityRule::new("", "x", "p", RuleSeverity::Error).is_err());
        assert!(QualityRule::new("r1", "x", "", RuleSeverity::Error).is_err());

        let rule = QualityRule::new("no-todo", "No TODO markers", "TODO", RuleSeverity::Warning)
            .unwrap();
        assert!(rule.severity.is_lint());
    }

    #[test]
    fn test_severity_lint_classification() {
        assert!(RuleSeverity::Error.is_lint());
        assert!(RuleSeverity::Warning.is_lint());
        assert!(!RuleSeverity::Info.is_lint());
    }

    #[test]
    fn test_check_result_passed() {
        let result = QualityCheckResult {
            rule_id: "r1".to_string(),
            rule_name: "rule".to_string(),
            status: CheckStatus::Pass,
            message: "ok".to_string(),
            suggestions: vec![],
        };
        assert!(result.passed());

        let failed = QualityCheckResult {
            status: CheckStatus::Fail,
            ..result
        };
        assert!(!failed.passed());
    }
}
