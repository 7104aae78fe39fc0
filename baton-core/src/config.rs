//! Engine configuration

use serde::{Deserialize, Serialize};

/// Configuration for orchestrator role cycles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stop dispatching the remaining steps of a cycle after the first
    /// failure instead of collecting all results
    pub halt_on_failure: bool,
    /// Upper bound on steps dispatched per role cycle; `None` runs the whole
    /// role subset
    pub max_steps_per_cycle: Option<usize>,
    /// Include advisory suggestions from handlers and profiles in reports
    pub advisory_suggestions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            halt_on_failure: false,
            max_steps_per_cycle: None,
            advisory_suggestions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert!(!config.halt_on_failure);
        assert!(config.max_steps_per_cycle.is_none());
        assert!(config.advisory_suggestions);
    }
}
