// Workflow state threaded through the state machine
//
// WorkflowState is the single mutable record nodes read and partially
// update. `results` and `errors` are merge/append-only within one run: a
// node fills its own slot and never clears another node's prior output.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use greenlight_contracts::{ActionRequest, DispatchSummary, ReActOutcome};

use crate::analysis::Analysis;
use crate::synthesizer::SynthesizedResponse;

/// Role of one conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One conversation turn (role + content)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }
}

/// Operating mode for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMode {
    /// Direct execution: analysis may route straight to dispatch
    #[default]
    None,
    /// Read-only exploration plus explicit human approval before any
    /// mutating action executes
    PlanMode,
}

impl ActiveMode {
    /// Parse the caller-supplied mode string; unknown values fall back to None
    pub fn parse(mode: &str) -> Self {
        match mode.to_lowercase().as_str() {
            "plan_mode" | "plan" => ActiveMode::PlanMode,
            _ => ActiveMode::None,
        }
    }
}

/// Mutable bag of routing flags for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunContext {
    /// Operating mode (default none)
    #[serde(default)]
    pub active_mode: ActiveMode,

    /// Currently-selected project, auto-filled into action params when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Session identifier, forwarded to the context provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Prior conversation turns carried across runs
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,

    /// Actions from a previously approved plan; non-empty means approval
    #[serde(default)]
    pub approved_plan_actions: Vec<ActionRequest>,

    /// Content of a previously approved plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_plan_content: Option<String>,

    /// Set while the plan-exploration node is producing a plan
    #[serde(default)]
    pub is_planning: bool,

    /// Set when a plan is pending human approval; dispatch is gated on this
    #[serde(default)]
    pub waiting_for_approval: bool,

    /// Per-run override of the ReAct iteration bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_mode(mut self, mode: ActiveMode) -> Self {
        self.active_mode = mode;
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_approved_plan(
        mut self,
        content: impl Into<String>,
        actions: Vec<ActionRequest>,
    ) -> Self {
        self.approved_plan_content = Some(content.into());
        self.approved_plan_actions = actions;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Whether this run carries explicit approved-plan actions
    pub fn has_approved_actions(&self) -> bool {
        !self.approved_plan_actions.is_empty()
    }
}

/// Output of the plan-exploration node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// Plan document content
    pub content: String,
    /// Provisional actions awaiting approval
    pub actions: Vec<ActionRequest>,
    /// Where the artifact was written
    pub artifact_path: String,
    /// Whether persistence succeeded (failure is logged, non-fatal)
    pub persisted: bool,
}

/// Deterministic payload produced by the error-handler node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Always "Workflow failed"
    pub error: String,
    /// Every accumulated error message, in order
    pub details: Vec<String>,
}

impl FailurePayload {
    pub fn new(details: Vec<String>) -> Self {
        Self {
            error: "Workflow failed".to_string(),
            details,
        }
    }
}

/// Per-node output slots, merged by shallow union on node completion
///
/// Slots are fill-only within a run: no node may delete another node's
/// prior output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanOutcome>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub react: Option<ReActOutcome>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<SynthesizedResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailurePayload>,

    /// Mirrors `RunContext::waiting_for_approval` so the synthesizer can
    /// operate on results alone
    #[serde(default)]
    pub waiting_for_approval: bool,
}

/// The single mutable record threaded through the state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Unique, time-ordered run identifier
    pub run_id: Uuid,

    /// Conversation turns; append-only within a run
    pub messages: Vec<ChatTurn>,

    /// Immutable organization identifier for the run
    pub organization_id: String,

    /// Immutable user identifier for the run
    pub user_id: String,

    /// Routing flags
    pub context: RunContext,

    /// Per-node outputs
    pub results: NodeResults,

    /// Append-only failures; non-empty routes to the error handler at the
    /// next edge evaluation
    pub errors: Vec<String>,
}

impl WorkflowState {
    pub fn new(
        messages: Vec<ChatTurn>,
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        context: RunContext,
    ) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            messages,
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            context,
            results: NodeResults::default(),
            errors: Vec::new(),
        }
    }

    /// Latest user turn, which is the request this run answers
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.content.as_str())
    }

    /// Append a conversation turn
    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.messages.push(turn);
    }

    /// Append a failure
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// User-facing response, when one was produced
    pub fn response(&self) -> Option<&SynthesizedResponse> {
        self.results.final_response.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_user_message_skips_assistant_turns() {
        let state = WorkflowState::new(
            vec![
                ChatTurn::user("first"),
                ChatTurn::assistant("reply"),
                ChatTurn::user("second"),
                ChatTurn::assistant("trailing"),
            ],
            "org-1",
            "user-1",
            RunContext::new(),
        );
        assert_eq!(state.latest_user_message(), Some("second"));
    }

    #[test]
    fn test_active_mode_parse() {
        assert_eq!(ActiveMode::parse("plan_mode"), ActiveMode::PlanMode);
        assert_eq!(ActiveMode::parse("PLAN"), ActiveMode::PlanMode);
        assert_eq!(ActiveMode::parse("none"), ActiveMode::None);
        assert_eq!(ActiveMode::parse("something_else"), ActiveMode::None);
    }

    #[test]
    fn test_errors_append_only() {
        let mut state =
            WorkflowState::new(vec![ChatTurn::user("hi")], "org", "user", RunContext::new());
        assert!(!state.has_errors());
        state.push_error("first failure");
        state.push_error("second failure");
        assert_eq!(state.errors.len(), 2);
    }
}
