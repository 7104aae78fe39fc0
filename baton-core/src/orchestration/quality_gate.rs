//! Quality gate evaluation
//!
//! The evaluator runs the configured pattern rules against the artifact a
//! step produced and reports exactly one pass/fail result per rule. Lint
//! rules (severity error/warning) fail when their pattern is found in the
//! content; info rules only annotate. The orchestrator folds passing rule
//! ids into the execution's satisfied-gate set before any transition is
//! attempted.

use regex::Regex;
use tracing::debug;

use crate::quality::{CheckStatus, QualityCheckResult, QualityRule};
use crate::role::Role;
use crate::workflow::WorkflowStep;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: QualityRule,
    pattern: Regex,
}

/// Runs pattern rules against step artifacts
#[derive(Debug, Clone, Default)]
pub struct QualityGateEvaluator {
    rules: Vec<CompiledRule>,
}

impl QualityGateEvaluator {
    /// Compile the configured rule set
    ///
    /// An unparseable pattern is a configuration error; the evaluator never
    /// carries rules it cannot run.
    pub fn new(rules: Vec<QualityRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let pattern = Regex::new(&rule.pattern).map_err(|e| {
                Error::configuration(format!(
                    "Quality rule '{}' has an invalid pattern: {}",
                    rule.id, e
                ))
            })?;
            compiled.push(CompiledRule { rule, pattern });
        }
        Ok(Self { rules: compiled })
    }

    /// An evaluator with no rules; every check set is trivially empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of configured rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every configured rule against a step artifact
    ///
    /// Returns exactly one result per rule.
    pub fn run_checks(
        &self,
        step: &WorkflowStep,
        role: &Role,
        content: &str,
    ) -> Vec<QualityCheckResult> {
        self.rules
            .iter()
            .map(|compiled| {
                let matches = compiled.pattern.find_iter(content).count();
                let rule = &compiled.rule;
                debug!(
                    rule = %rule.id,
                    step = %step.id,
                    matches,
                    "evaluated quality rule"
                );
                if rule.severity.is_lint() && matches > 0 {
                    QualityCheckResult {
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        status: CheckStatus::Fail,
                        message: format!(
                            "Pattern '{}' matched {} time(s) in artifact of step '{}'",
                            rule.pattern, matches, step.id
                        ),
                        suggestions: vec![format!(
                            "Resolve '{}' findings before {} hands off",
                            rule.name, role.name
                        )],
                    }
                } else {
                    let message = if matches > 0 {
                        format!(
                            "Pattern '{}' matched {} time(s); informational only",
                            rule.pattern, matches
                        )
                    } else {
                        format!("No matches for pattern '{}'", rule.pattern)
                    };
                    QualityCheckResult {
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        status: CheckStatus::Pass,
                        message,
                        suggestions: Vec::new(),
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::RuleSeverity;
    use crate::role::Capability;
    use crate::workflow::ActionKind;

    fn fixture() -> (WorkflowStep, Role) {
        let step = WorkflowStep::builder()
            .id("impl")
            .action(ActionKind::Create)
            .build()
            .unwrap();
        let role = Role::builder()
            .id("implementer")
            .name("Implementer")
            .capability(Capability::CodeImplementation)
            .build()
            .unwrap();
        (step, role)
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let rules = vec![QualityRule::new(
            "broken",
            "Broken rule",
            "([unclosed",
            RuleSeverity::Error,
        )
        .unwrap()];
        let err = QualityGateEvaluator::new(rules).unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_lint_rule_fails_on_match() {
        let (step, role) = fixture();
        let evaluator = QualityGateEvaluator::new(vec![QualityRule::new(
            "no-unwrap",
            "No unwrap in production code",
            r"\.unwrap\(\)",
            RuleSeverity::Error,
        )
        .unwrap()])
        .unwrap();

        let results = evaluator.run_checks(&step, &role, "let x = foo().unwrap();");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Fail);
        assert!(results[0].message.contains("matched 1 time(s)"));
        assert!(!results[0].suggestions.is_empty());

        let clean = evaluator.run_checks(&step, &role, "let x = foo()?;");
        assert_eq!(clean[0].status, CheckStatus::Pass);
    }

    #[test]
    fn test_info_rule_always_passes() {
        let (step, role) = fixture();
        let evaluator = QualityGateEvaluator::new(vec![QualityRule::new(
            "async-usage",
            "Tracks async usage",
            r"async fn",
            RuleSeverity::Info,
        )
        .unwrap()])
        .unwrap();

        let results = evaluator.run_checks(&step, &role, "async fn run() {}");
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert!(results[0].message.contains("informational"));
    }

    #[test]
    fn test_one_result_per_rule() {
        let (step, role) = fixture();
        let evaluator = QualityGateEvaluator::new(vec![
            QualityRule::new("a", "A", "aaa", RuleSeverity::Error).unwrap(),
            QualityRule::new("b", "B", "bbb", RuleSeverity::Warning).unwrap(),
            QualityRule::new("c", "C", "ccc", RuleSeverity::Info).unwrap(),
        ])
        .unwrap();

        let results = evaluator.run_checks(&step, &role, "aaa ccc");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, CheckStatus::Fail);
        assert_eq!(results[1].status, CheckStatus::Pass);
        assert_eq!(results[2].status, CheckStatus::Pass);
    }

    #[test]
    fn test_empty_evaluator() {
        let (step, role) = fixture();
        let evaluator = QualityGateEvaluator::empty();
        assert_eq!(evaluator.rule_count(), 0);
        assert!(evaluator.run_checks(&step, &role, "anything").is_empty());
    }
}
