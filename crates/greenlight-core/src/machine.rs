// The workflow state machine
//
// An explicit finite-state machine: a node enum, one handler per node, and
// a routing function evaluated after each node completes. No graph-execution
// library. A run is a single logical task; every await is a collaborator
// call; errors accumulated in state route to the error handler at the next
// edge evaluation.

use std::sync::Arc;

use tracing::{error, info, warn};

use greenlight_contracts::{ContextSnapshot, ReActOutcome};

use crate::analysis::{is_approval_utterance, Analysis};
use crate::config::WorkflowConfig;
use crate::dispatch::dispatch_actions;
use crate::intent::{classify_intent, IntentShape};
use crate::react::ReActLoop;
use crate::state::{
    ActiveMode, ChatTurn, FailurePayload, PlanOutcome, RunContext, WorkflowState,
};
use crate::synthesizer::synthesize;
use crate::traits::{ContextProvider, LanguageModel, PlanStore, RegistryRouter};

/// Nodes of the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Analysis,
    PlanExploration,
    ActionDispatch,
    React,
    Synthesize,
    ErrorHandler,
    End,
}

/// Per-run scratch that is not part of WorkflowState (the snapshot is an
/// opaque pass-through, not a routing flag)
struct RunScratch {
    snapshot: ContextSnapshot,
}

/// The orchestration engine
///
/// Converts one natural-language request into either an executed sequence
/// of tool invocations or a plan pending human approval. Collaborators are
/// injected at construction time.
pub struct Orchestrator<L, C, P>
where
    L: LanguageModel,
    C: ContextProvider,
    P: PlanStore,
{
    config: WorkflowConfig,
    llm: Arc<L>,
    context_provider: Arc<C>,
    plan_store: Arc<P>,
    registry: RegistryRouter,
}

impl<L, C, P> Orchestrator<L, C, P>
where
    L: LanguageModel,
    C: ContextProvider,
    P: PlanStore,
{
    /// Create a new orchestrator
    pub fn new(
        config: WorkflowConfig,
        llm: L,
        context_provider: C,
        plan_store: P,
        registry: RegistryRouter,
    ) -> Self {
        Self {
            config,
            llm: Arc::new(llm),
            context_provider: Arc::new(context_provider),
            plan_store: Arc::new(plan_store),
            registry,
        }
    }

    /// Create a new orchestrator from Arc-wrapped collaborators
    pub fn with_arcs(
        config: WorkflowConfig,
        llm: Arc<L>,
        context_provider: Arc<C>,
        plan_store: Arc<P>,
        registry: RegistryRouter,
    ) -> Self {
        Self {
            config,
            llm,
            context_provider,
            plan_store,
            registry,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Run one request through the state machine
    ///
    /// Always returns a state: terminal failures land in
    /// `results.failure`, never as a panic or an Err from this surface.
    pub async fn run(
        &self,
        messages: Vec<ChatTurn>,
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        context: RunContext,
    ) -> WorkflowState {
        let mut state = WorkflowState::new(messages, organization_id, user_id, context);
        let mut scratch = RunScratch {
            snapshot: ContextSnapshot::empty(),
        };

        info!(
            run_id = %state.run_id,
            organization_id = %state.organization_id,
            user_id = %state.user_id,
            active_mode = ?state.context.active_mode,
            "Starting workflow run"
        );

        let mut node = Node::Analysis;
        loop {
            match node {
                Node::Analysis => self.analysis_node(&mut state, &mut scratch).await,
                Node::PlanExploration => self.plan_node(&mut state, &scratch).await,
                Node::ActionDispatch => self.dispatch_node(&mut state).await,
                Node::React => self.react_node(&mut state, &scratch).await,
                Node::Synthesize => self.synthesize_node(&mut state),
                Node::ErrorHandler => self.error_handler_node(&mut state),
                Node::End => break,
            }
            node = route_after(node, &state);
        }

        info!(
            run_id = %state.run_id,
            errors = state.errors.len(),
            "Workflow run finished"
        );
        state
    }

    /// Run the self-contained ReAct loop directly, without the routing graph
    pub async fn run_react(
        &self,
        message: &str,
        organization_id: &str,
        user_id: &str,
        context: RunContext,
    ) -> ReActOutcome {
        let snapshot = self
            .fetch_snapshot(message, organization_id, user_id, context.session_id.as_deref())
            .await;
        let bound = context.max_iterations.unwrap_or(self.config.max_iterations);
        ReActLoop::new(
            self.llm.as_ref(),
            &self.registry,
            bound,
            self.config.history_window,
        )
        .run(
            message,
            &snapshot,
            &context.conversation_history,
            organization_id,
            user_id,
        )
        .await
    }

    // =========================================================================
    // Node handlers
    // =========================================================================

    async fn analysis_node(&self, state: &mut WorkflowState, scratch: &mut RunScratch) {
        let Some(message) = state.latest_user_message().map(str::to_string) else {
            state.push_error("No messages to process");
            return;
        };

        // Plan-mode gating happens before any LLM call
        if state.context.active_mode == ActiveMode::PlanMode {
            let approval_signal =
                state.context.has_approved_actions() || is_approval_utterance(&message);
            let has_prior_plan = state.context.has_approved_actions()
                || state.context.approved_plan_content.is_some();

            if approval_signal && has_prior_plan {
                info!("Approval signal present, dispatching previously approved actions");
                state.results.analysis = Some(Analysis::approved_plan(
                    state.context.approved_plan_actions.clone(),
                    state.context.approved_plan_content.clone(),
                ));
                return;
            }

            info!("Plan mode without approval, routing to plan exploration");
            state.context.is_planning = true;
            // Exploration may inspect context, so fetch the snapshot now
            scratch.snapshot = self
                .fetch_snapshot(
                    &message,
                    &state.organization_id,
                    &state.user_id,
                    state.context.session_id.as_deref(),
                )
                .await;
            state.results.analysis = Some(Analysis::plan_mode());
            return;
        }

        scratch.snapshot = self
            .fetch_snapshot(
                &message,
                &state.organization_id,
                &state.user_id,
                state.context.session_id.as_deref(),
            )
            .await;

        let history = self.combined_history(state);
        let analysis = match self
            .llm
            .respond(
                &message,
                &scratch.snapshot,
                state.context.active_mode,
                &history,
            )
            .await
        {
            Ok(reply) => Analysis::from_reply(&reply),
            Err(err) => {
                // Degraded-but-valid: a collaborator failure never crashes
                // the state machine
                warn!(error = %err, "LLM analysis call failed, degrading");
                Analysis::degraded(err.to_string())
            }
        };

        info!(
            requires_actions = analysis.requires_actions,
            requires_document_knowledge = analysis.requires_document_knowledge,
            is_plan_mode = analysis.is_plan_mode,
            explicit_actions = analysis.actions.len(),
            "Analysis complete"
        );
        state.results.analysis = Some(analysis);
    }

    async fn plan_node(&self, state: &mut WorkflowState, scratch: &RunScratch) {
        let Some(message) = state.latest_user_message().map(str::to_string) else {
            state.push_error("No messages to process");
            return;
        };

        let history = self.combined_history(state);
        let exploration = match self
            .llm
            .explore_read_only(&message, &scratch.snapshot, &history)
            .await
        {
            Ok(exploration) => exploration,
            Err(err) => {
                state.push_error(format!("Plan exploration failed: {err}"));
                return;
            }
        };

        // Single fixed artifact path, overwritten each time; persistence
        // failure is logged but non-fatal to the response
        let persisted = match self
            .plan_store
            .save(&self.config.plan_artifact_path, &exploration.plan_text)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    path = %self.config.plan_artifact_path,
                    error = %err,
                    "Plan artifact persistence failed"
                );
                false
            }
        };

        info!(
            proposed_actions = exploration.proposed_actions.len(),
            persisted, "Plan exploration complete, awaiting approval"
        );

        state.results.plan = Some(PlanOutcome {
            content: exploration.plan_text,
            actions: exploration.proposed_actions,
            artifact_path: self.config.plan_artifact_path.clone(),
            persisted,
        });
        state.results.waiting_for_approval = true;
        state.context.waiting_for_approval = true;
    }

    async fn dispatch_node(&self, state: &mut WorkflowState) {
        let actions = state
            .results
            .analysis
            .as_ref()
            .map(|a| a.actions.clone())
            .unwrap_or_default();

        let summary = dispatch_actions(
            &self.registry,
            &actions,
            &state.context,
            &state.organization_id,
            &state.user_id,
        )
        .await;

        state.results.dispatch = Some(summary);
    }

    async fn react_node(&self, state: &mut WorkflowState, scratch: &RunScratch) {
        let Some(message) = state.latest_user_message().map(str::to_string) else {
            state.push_error("No messages to process");
            return;
        };

        let bound = state
            .context
            .max_iterations
            .unwrap_or(self.config.max_iterations);
        let history = self.combined_history(state);

        let outcome = ReActLoop::new(
            self.llm.as_ref(),
            &self.registry,
            bound,
            self.config.history_window,
        )
        .run(
            &message,
            &scratch.snapshot,
            &history,
            &state.organization_id,
            &state.user_id,
        )
        .await;

        state.results.react = Some(outcome);
    }

    fn synthesize_node(&self, state: &mut WorkflowState) {
        let response = synthesize(&state.results);
        state.push_turn(ChatTurn::assistant(response.message.clone()));
        state.results.final_response = Some(response);
    }

    fn error_handler_node(&self, state: &mut WorkflowState) {
        for err in &state.errors {
            error!(error = %err, "Workflow error");
        }
        state.results.failure = Some(FailurePayload::new(state.errors.clone()));
        // The response always carries a message, even on failure
        if state.results.final_response.is_none() {
            state.results.final_response = Some(crate::synthesizer::SynthesizedResponse {
                message: "Workflow failed".to_string(),
                requires_approval: false,
                plan_content: None,
                executed_actions: Vec::new(),
            });
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Select and fetch the context snapshot variant for a message
    async fn fetch_snapshot(
        &self,
        message: &str,
        organization_id: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> ContextSnapshot {
        let result = match classify_intent(message) {
            IntentShape::Graph => {
                self.context_provider
                    .minimal_snapshot(organization_id, user_id)
                    .await
            }
            IntentShape::Full => {
                self.context_provider
                    .full_snapshot(organization_id, user_id, session_id)
                    .await
            }
        };

        match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Context snapshot failed, continuing ungrounded");
                ContextSnapshot::empty()
            }
        }
    }

    /// Prior-run history followed by this run's turns
    fn combined_history(&self, state: &WorkflowState) -> Vec<ChatTurn> {
        let mut history = state.context.conversation_history.clone();
        history.extend(state.messages.iter().cloned());
        history
    }
}

/// Routing predicate evaluated after each node completes
fn route_after(node: Node, state: &WorkflowState) -> Node {
    // Accumulated errors preempt normal routing
    if state.has_errors() && node != Node::ErrorHandler {
        return Node::ErrorHandler;
    }

    match node {
        Node::Analysis => {
            let Some(analysis) = state.results.analysis.as_ref() else {
                return Node::ErrorHandler;
            };
            if analysis.is_plan_mode {
                Node::PlanExploration
            } else if !analysis.actions.is_empty() {
                Node::ActionDispatch
            } else if analysis.requires_actions || analysis.requires_document_knowledge {
                // Tool calling without a committed action list is the ReAct
                // loop's territory
                Node::React
            } else {
                Node::Synthesize
            }
        }
        Node::PlanExploration | Node::ActionDispatch | Node::React => Node::Synthesize,
        Node::Synthesize | Node::ErrorHandler | Node::End => Node::End,
    }
}
