// Wire types for the Greenlight orchestration core
//
// These are the serde types that cross the boundary between the engine and
// its collaborators (tool registries, context provider, LLM capability,
// plan persistence). They carry no behavior beyond constructors and small
// accessors; the engine lives in greenlight-core.

pub mod action;
pub mod context;
pub mod llm;
pub mod react;
pub mod tools;

pub use action::{ActionRecord, ActionRequest, DispatchSummary};
pub use context::ContextSnapshot;
pub use llm::{AnalysisHints, Exploration, LlmReply};
pub use react::{ReActOutcome, ReActStep};
pub use tools::ToolOutcome;
