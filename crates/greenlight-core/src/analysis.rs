// Request analysis: routing signals derived from the LLM reply
//
// Detection is a best-effort structured-output contract: structured hints on
// the reply win when present, with lexical substring checks on the lowered
// text as the fallback. The lexical word lists are heuristic by design and
// are preserved as observed behavior rather than tightened.

use serde::{Deserialize, Serialize};

use greenlight_contracts::{ActionRequest, LlmReply};

/// Words marking a request as document/knowledge-base shaped
const DOCUMENT_MARKERS: &[&str] = &["document", "knowledge base", "notebook", "source file"];

/// Words marking a request as needing tool execution
const ACTION_MARKERS: &[&str] = &[
    "create", "update", "delete", "assign", "report", "analyze", "schedule", "add ", "remove",
];

/// Approval utterances that release a pending plan for execution
const APPROVAL_UTTERANCES: &[&str] = &[
    "proceed",
    "approve",
    "approved",
    "go ahead",
    "execute",
    "run it",
    "looks good",
    "yes, do it",
    "confirm",
];

/// Output of the analysis node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// Request needs knowledge-base / document lookup
    pub requires_document_knowledge: bool,
    /// Request needs tool execution
    pub requires_actions: bool,
    /// Request should produce a plan instead of executing
    pub is_plan_mode: bool,
    /// Explicit action list, when the model proposed one
    #[serde(default)]
    pub actions: Vec<ActionRequest>,
    /// Raw model response text
    pub response_text: String,
    /// Recorded collaborator failure, when analysis was degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Analysis {
    /// Interpret an LLM reply into routing signals
    pub fn from_reply(reply: &LlmReply) -> Self {
        if let Some(hints) = &reply.hints {
            return Self {
                requires_document_knowledge: hints.requires_document_knowledge,
                requires_actions: hints.requires_actions,
                is_plan_mode: hints.is_plan_mode,
                actions: hints.actions.clone(),
                response_text: reply.text.clone(),
                error: None,
            };
        }

        let lowered = reply.text.to_lowercase();
        Self {
            requires_document_knowledge: detects_document_knowledge(&lowered),
            requires_actions: detects_actions(&lowered),
            is_plan_mode: false,
            actions: Vec::new(),
            response_text: reply.text.clone(),
            error: None,
        }
    }

    /// Degraded-but-valid analysis used when the LLM call fails: the run
    /// continues toward tool execution rather than aborting.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            requires_document_knowledge: false,
            requires_actions: true,
            is_plan_mode: false,
            actions: Vec::new(),
            response_text: String::new(),
            error: Some(error.into()),
        }
    }

    /// Analysis for an approved plan: routes straight to dispatch with the
    /// previously approved actions, no fresh LLM call. An approval with no
    /// stored actions has nothing to execute and falls through to synthesis.
    pub fn approved_plan(actions: Vec<ActionRequest>, plan_content: Option<String>) -> Self {
        Self {
            requires_document_knowledge: false,
            requires_actions: !actions.is_empty(),
            is_plan_mode: false,
            actions,
            response_text: plan_content.unwrap_or_default(),
            error: None,
        }
    }

    /// Analysis for an unapproved plan-mode run: routes to plan exploration.
    pub fn plan_mode() -> Self {
        Self {
            requires_document_knowledge: false,
            requires_actions: false,
            is_plan_mode: true,
            actions: Vec::new(),
            response_text: String::new(),
            error: None,
        }
    }
}

/// Lexical check for document/knowledge-base requests (expects lowered text)
fn detects_document_knowledge(lowered: &str) -> bool {
    DOCUMENT_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Lexical check for tool-execution requests (expects lowered text)
fn detects_actions(lowered: &str) -> bool {
    ACTION_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Whether a message text releases a pending plan for execution
pub fn is_approval_utterance(message: &str) -> bool {
    let lowered = message.to_lowercase();
    APPROVAL_UTTERANCES.iter().any(|u| lowered.contains(u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_contracts::AnalysisHints;

    #[test]
    fn test_lexical_action_detection() {
        let analysis = Analysis::from_reply(&LlmReply::text(
            "I will create a project and assign the crew.",
        ));
        assert!(analysis.requires_actions);
        assert!(!analysis.is_plan_mode);
    }

    #[test]
    fn test_lexical_document_detection() {
        let analysis = Analysis::from_reply(&LlmReply::text(
            "Let me check the knowledge base for that clause.",
        ));
        assert!(analysis.requires_document_knowledge);
    }

    #[test]
    fn test_hints_take_precedence_over_text() {
        // Text says "create" but the structured hint says no actions needed
        let reply = LlmReply::with_hints(
            "We could create something later.",
            AnalysisHints {
                requires_actions: false,
                ..Default::default()
            },
        );
        let analysis = Analysis::from_reply(&reply);
        assert!(!analysis.requires_actions);
    }

    #[test]
    fn test_degraded_analysis_still_routes_to_actions() {
        let analysis = Analysis::degraded("model timed out");
        assert!(analysis.requires_actions);
        assert!(!analysis.is_plan_mode);
        assert_eq!(analysis.error.as_deref(), Some("model timed out"));
    }

    #[test]
    fn test_approval_utterances() {
        assert!(is_approval_utterance("Looks good, go ahead"));
        assert!(is_approval_utterance("PROCEED"));
        assert!(is_approval_utterance("please run it"));
        assert!(!is_approval_utterance("tell me more about the plan"));
    }
}
