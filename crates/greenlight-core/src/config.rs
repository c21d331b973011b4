// Workflow configuration
//
// WorkflowConfig is a deployment-level configuration struct: iteration
// bound, plan artifact location, and how much history the ReAct prompt
// carries. Per-run overrides (e.g. max_iterations) live in RunContext.

use serde::{Deserialize, Serialize};

/// Configuration for the orchestration core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum ReAct rounds (prevents unbounded tool-calling loops)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Fixed plan artifact location, overwritten on each plan exploration
    #[serde(default = "default_plan_artifact_path")]
    pub plan_artifact_path: String,

    /// How many trailing conversation turns the ReAct think prompt includes
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_max_iterations() -> usize {
    10
}

fn default_plan_artifact_path() -> String {
    "plans/current-plan.md".to_string()
}

fn default_history_window() -> usize {
    6
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ReAct iteration bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the plan artifact path
    pub fn with_plan_artifact_path(mut self, path: impl Into<String>) -> Self {
        self.plan_artifact_path = path.into();
        self
    }

    /// Set the ReAct history window
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            plan_artifact_path: default_plan_artifact_path(),
            history_window: default_history_window(),
        }
    }
}
