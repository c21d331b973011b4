// Error types for the orchestration core

use thiserror::Error;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors reported by collaborators (LLM, registries, context provider,
/// plan store)
///
/// The engine recovers these at the call site wherever it can: degraded
/// analysis, per-action failure records, warn-and-continue on snapshot and
/// persistence failures.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// LLM capability error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool registry error
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Context provider error
    #[error("Context provider error: {0}")]
    ContextProvider(String),

    /// Plan artifact persistence error
    #[error("Plan store error: {0}")]
    PlanStore(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        WorkflowError::Llm(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        WorkflowError::ToolExecution(msg.into())
    }

    /// Create a context provider error
    pub fn context(msg: impl Into<String>) -> Self {
        WorkflowError::ContextProvider(msg.into())
    }

    /// Create a plan store error
    pub fn plan_store(msg: impl Into<String>) -> Self {
        WorkflowError::PlanStore(msg.into())
    }
}
