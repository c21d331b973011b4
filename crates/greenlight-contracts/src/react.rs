// ReAct loop step records
//
// One record per THINK/ACT/OBSERVE round. The full, append-only sequence is
// returned even when the run was truncated by the iteration bound, so runs
// can be replayed and audited.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One iteration of the ReAct loop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReActStep {
    /// 1-based round number
    pub iteration: usize,
    /// Raw model thought for this round
    pub thought: String,
    /// Parsed action directive, if one was found: `{name, arguments}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    /// Serialized tool result (or error string) for the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    /// Extracted final answer, when this round terminated the loop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Terminal result of a ReAct run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReActOutcome {
    /// Whether a final answer was extracted before the bound was hit
    pub success: bool,
    /// Final answer, or a best-effort fallback when the bound was exhausted
    pub answer: String,
    /// Rounds executed (equals `steps.len()`)
    pub iterations: usize,
    /// Full step log, in execution order
    pub steps: Vec<ReActStep>,
}
