// Collaborator traits for pluggable backends
//
// The engine never talks to a concrete service: the LLM capability, the two
// tool registries, the context provider, and plan persistence are all
// injected at construction time, so tests and examples substitute the
// in-memory implementations from the `memory` module.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use greenlight_contracts::{ContextSnapshot, Exploration, LlmReply, ToolOutcome};

use crate::error::Result;
use crate::state::{ActiveMode, ChatTurn};

// ============================================================================
// ToolRegistry - named, parameterized operations with a uniform result shape
// ============================================================================

/// A capability provider exposing named operations
///
/// Two instances exist per deployment: a data registry (read/write on core
/// business entities) and a workflow-function registry (workflow templates
/// and instances). Implementations must be safe to call with
/// already-resolved parameters; the core performs no implicit retries.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Execute a named operation
    async fn execute(
        &self,
        name: &str,
        params: &Map<String, Value>,
        organization_id: &str,
        user_id: &str,
    ) -> Result<ToolOutcome>;

    /// Whether this registry declares the named operation
    fn contains(&self, name: &str) -> bool;
}

/// Routes each action to whichever registry declares its type
///
/// Membership test, not a runtime flag: the data registry is consulted
/// first, and anything it does not declare goes to the workflow-function
/// registry. Call sites never branch on a backend.
#[derive(Clone)]
pub struct RegistryRouter {
    data: Arc<dyn ToolRegistry>,
    workflow: Arc<dyn ToolRegistry>,
}

impl RegistryRouter {
    pub fn new(data: Arc<dyn ToolRegistry>, workflow: Arc<dyn ToolRegistry>) -> Self {
        Self { data, workflow }
    }

    /// The backend that will serve the named operation
    pub fn backend_for(&self, name: &str) -> &Arc<dyn ToolRegistry> {
        if self.data.contains(name) {
            &self.data
        } else {
            &self.workflow
        }
    }

    /// Execute through the selected backend
    pub async fn execute(
        &self,
        name: &str,
        params: &Map<String, Value>,
        organization_id: &str,
        user_id: &str,
    ) -> Result<ToolOutcome> {
        self.backend_for(name)
            .execute(name, params, organization_id, user_id)
            .await
    }

    /// Whether either backend declares the named operation
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains(name) || self.workflow.contains(name)
    }
}

// ============================================================================
// ContextProvider - organizational grounding snapshots
// ============================================================================

/// Produces organizational state snapshots used as LLM grounding context
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Full organizational snapshot
    async fn full_snapshot(
        &self,
        organization_id: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<ContextSnapshot>;

    /// Cheaper snapshot for relationship/graph-shaped queries
    async fn minimal_snapshot(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<ContextSnapshot>;
}

// ============================================================================
// LanguageModel - the opaque LLM capability
// ============================================================================

/// The LLM capability: accepts a prompt plus context, returns structured or
/// free text. The core only requires that free-text replies can carry the
/// lexical markers the analysis node and ReAct loop look for.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Answer or route a user message
    async fn respond(
        &self,
        message: &str,
        context: &ContextSnapshot,
        mode: ActiveMode,
        history: &[ChatTurn],
    ) -> Result<LlmReply>;

    /// Read-only exploration for plan authoring: may inspect context but
    /// must not request execution of any mutating action
    async fn explore_read_only(
        &self,
        message: &str,
        context: &ContextSnapshot,
        history: &[ChatTurn],
    ) -> Result<Exploration>;
}

// ============================================================================
// PlanStore - plan artifact persistence
// ============================================================================

/// Persists plan artifacts at a fixed location with overwrite semantics
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Write (or overwrite) the plan content at `path`
    async fn save(&self, path: &str, content: &str) -> Result<()>;
}
