// Greenlight orchestration core
//
// Converts a single natural-language request into either an executed
// sequence of tool invocations or a reviewable plan that a human must
// approve before any tool executes.
//
// Key design decisions:
// - Explicit finite-state machine (node enum + routing function) instead of
//   a graph-execution library
// - Collaborators (LanguageModel, ToolRegistry, ContextProvider, PlanStore)
//   are constructor-injected traits, so tests substitute the in-memory
//   implementations in `memory`
// - Failures are recovered as close to their source as possible: degraded
//   analysis, per-action failure records, per-round parse fallbacks; only
//   state-machine-level inconsistencies reach the error handler
// - Dispatch is strictly sequential so later actions can reference earlier
//   results via `$variable` params
// - The ReAct iteration bound is the one internal safety mechanism; external
//   deadlines belong to the invoking environment

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod machine;
pub mod react;
pub mod state;
pub mod synthesizer;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use analysis::{is_approval_utterance, Analysis};
pub use config::WorkflowConfig;
pub use dispatch::{dispatch_actions, ActionResultStore};
pub use error::{Result, WorkflowError};
pub use intent::{classify_intent, IntentShape};
pub use machine::Orchestrator;
pub use react::{extract_answer, parse_action, ReActLoop};
pub use state::{
    ActiveMode, ChatTurn, FailurePayload, NodeResults, PlanOutcome, RunContext, TurnRole,
    WorkflowState,
};
pub use synthesizer::{synthesize, SynthesizedResponse};
pub use traits::{ContextProvider, LanguageModel, PlanStore, RegistryRouter, ToolRegistry};

// Contract types re-exports
pub use greenlight_contracts::{
    ActionRecord, ActionRequest, AnalysisHints, ContextSnapshot, DispatchSummary, Exploration,
    LlmReply, ReActOutcome, ReActStep, ToolOutcome,
};
