// LLM capability reply shapes
//
// Free-text replies may carry lexical routing markers; `hints` is the
// structured alternative the analysis node prefers when present.

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;

/// Reply from the LLM capability's `respond` call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmReply {
    /// Free-text response
    pub text: String,
    /// Optional structured routing hints; takes precedence over lexical
    /// detection on `text` when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<AnalysisHints>,
}

impl LlmReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hints: None,
        }
    }

    pub fn with_hints(text: impl Into<String>, hints: AnalysisHints) -> Self {
        Self {
            text: text.into(),
            hints: Some(hints),
        }
    }
}

/// Structured routing hints attached to an LLM reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisHints {
    /// Request needs knowledge-base / document lookup
    #[serde(default)]
    pub requires_document_knowledge: bool,
    /// Request needs tool execution
    #[serde(default)]
    pub requires_actions: bool,
    /// Request should be answered with a plan, not executed
    #[serde(default)]
    pub is_plan_mode: bool,
    /// Explicit action list proposed by the model
    #[serde(default)]
    pub actions: Vec<ActionRequest>,
}

/// Result of the read-only plan-exploration call
///
/// Exploration must not execute anything; `proposed_actions` are descriptors
/// awaiting human approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exploration {
    /// Plan document (markdown-equivalent free text)
    pub plan_text: String,
    /// Provisional action list for a later, approved run
    #[serde(default)]
    pub proposed_actions: Vec<ActionRequest>,
}
