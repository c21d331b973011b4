// In-memory collaborator implementations for examples and testing
//
// These keep all data in memory: scripted LLM replies, a recording tool
// registry, a plan store backed by a HashMap, and a static context
// provider. They are the substitutes the orchestrator's constructor-injected
// design exists for.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use greenlight_contracts::{ContextSnapshot, Exploration, LlmReply, ToolOutcome};

use crate::error::{Result, WorkflowError};
use crate::state::{ActiveMode, ChatTurn};
use crate::traits::{ContextProvider, LanguageModel, PlanStore, ToolRegistry};

// ============================================================================
// ScriptedLanguageModel - returns predefined replies in sequence
// ============================================================================

/// Scripted LLM capability for testing
///
/// Returns queued replies/explorations in order; logs every call.
#[derive(Debug, Default)]
pub struct ScriptedLanguageModel {
    replies: Arc<RwLock<Vec<LlmReply>>>,
    reply_index: Arc<RwLock<usize>>,
    explorations: Arc<RwLock<Vec<Exploration>>>,
    exploration_index: Arc<RwLock<usize>>,
    respond_error: Arc<RwLock<Option<String>>>,
    explore_error: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<Vec<(String, ActiveMode)>>>,
}

impl ScriptedLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `respond`, in order
    pub async fn set_replies(&self, replies: Vec<LlmReply>) {
        *self.replies.write().await = replies;
        *self.reply_index.write().await = 0;
    }

    /// Queue explorations for `explore_read_only`, in order
    pub async fn set_explorations(&self, explorations: Vec<Exploration>) {
        *self.explorations.write().await = explorations;
        *self.exploration_index.write().await = 0;
    }

    /// Make every subsequent `respond` call fail
    pub async fn fail_respond(&self, error: impl Into<String>) {
        *self.respond_error.write().await = Some(error.into());
    }

    /// Make every subsequent `explore_read_only` call fail
    pub async fn fail_explore(&self, error: impl Into<String>) {
        *self.explore_error.write().await = Some(error.into());
    }

    /// Messages and modes passed to `respond`, in call order
    pub async fn calls(&self) -> Vec<(String, ActiveMode)> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn respond(
        &self,
        message: &str,
        _context: &ContextSnapshot,
        mode: ActiveMode,
        _history: &[ChatTurn],
    ) -> Result<LlmReply> {
        self.calls.write().await.push((message.to_string(), mode));

        if let Some(error) = self.respond_error.read().await.clone() {
            return Err(WorkflowError::llm(error));
        }

        let mut index = self.reply_index.write().await;
        let replies = self.replies.read().await;
        let reply = replies
            .get(*index)
            .cloned()
            .unwrap_or_else(|| LlmReply::text("Scripted reply (queue exhausted)"));
        *index += 1;
        Ok(reply)
    }

    async fn explore_read_only(
        &self,
        _message: &str,
        _context: &ContextSnapshot,
        _history: &[ChatTurn],
    ) -> Result<Exploration> {
        if let Some(error) = self.explore_error.read().await.clone() {
            return Err(WorkflowError::llm(error));
        }

        let mut index = self.exploration_index.write().await;
        let explorations = self.explorations.read().await;
        let exploration = explorations.get(*index).cloned().unwrap_or_default();
        *index += 1;
        Ok(exploration)
    }
}

// ============================================================================
// RecordingToolRegistry - declared names, scripted outcomes, call log
// ============================================================================

/// In-memory tool registry that records every call
///
/// `contains` answers from the declared name set; `execute` returns the
/// scripted outcome for the name (default `{"status": "ok"}`).
#[derive(Debug, Default)]
pub struct RecordingToolRegistry {
    declared: HashSet<String>,
    results: Arc<RwLock<HashMap<String, Value>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<(String, Map<String, Value>)>>>,
}

impl RecordingToolRegistry {
    /// Create a registry declaring the given operation names
    pub fn new(declared: &[&str]) -> Self {
        Self {
            declared: declared.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Script the success data for an operation
    pub async fn set_result(&self, name: impl Into<String>, data: Value) {
        self.results.write().await.insert(name.into(), data);
    }

    /// Script a failure for an operation
    pub async fn set_failure(&self, name: impl Into<String>, error: impl Into<String>) {
        self.failures.write().await.insert(name.into(), error.into());
    }

    /// Calls received, in order: (name, resolved params)
    pub async fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl ToolRegistry for RecordingToolRegistry {
    async fn execute(
        &self,
        name: &str,
        params: &Map<String, Value>,
        _organization_id: &str,
        _user_id: &str,
    ) -> Result<ToolOutcome> {
        self.calls
            .write()
            .await
            .push((name.to_string(), params.clone()));

        if let Some(error) = self.failures.read().await.get(name) {
            return Ok(ToolOutcome::err(error.clone()));
        }

        let data = self
            .results
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_else(|| json!({"status": "ok"}));
        Ok(ToolOutcome::ok(data))
    }

    fn contains(&self, name: &str) -> bool {
        self.declared.contains(name)
    }
}

// ============================================================================
// InMemoryPlanStore - plan artifacts in a HashMap
// ============================================================================

/// In-memory plan artifact store
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: Arc<RwLock<HashMap<String, String>>>,
    fail: Arc<RwLock<bool>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail
    pub async fn fail_saves(&self) {
        *self.fail.write().await = true;
    }

    /// Content last saved at `path`
    pub async fn saved(&self, path: &str) -> Option<String> {
        self.plans.read().await.get(path).cloned()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn save(&self, path: &str, content: &str) -> Result<()> {
        if *self.fail.read().await {
            return Err(WorkflowError::plan_store("simulated persistence failure"));
        }
        self.plans
            .write()
            .await
            .insert(path.to_string(), content.to_string());
        Ok(())
    }
}

// ============================================================================
// StaticContextProvider - fixed snapshots, records which variant was used
// ============================================================================

/// Context provider returning fixed snapshots
#[derive(Debug, Default)]
pub struct StaticContextProvider {
    full: Value,
    minimal: Value,
    requested: Arc<RwLock<Vec<String>>>,
}

impl StaticContextProvider {
    pub fn new(full: Value, minimal: Value) -> Self {
        Self {
            full,
            minimal,
            requested: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot variants requested, in order ("full" / "minimal")
    pub async fn requested(&self) -> Vec<String> {
        self.requested.read().await.clone()
    }
}

#[async_trait]
impl ContextProvider for StaticContextProvider {
    async fn full_snapshot(
        &self,
        _organization_id: &str,
        _user_id: &str,
        _session_id: Option<&str>,
    ) -> Result<ContextSnapshot> {
        self.requested.write().await.push("full".to_string());
        Ok(ContextSnapshot::from(self.full.clone()))
    }

    async fn minimal_snapshot(
        &self,
        _organization_id: &str,
        _user_id: &str,
    ) -> Result<ContextSnapshot> {
        self.requested.write().await.push("minimal".to_string());
        Ok(ContextSnapshot::from(self.minimal.clone()))
    }
}
