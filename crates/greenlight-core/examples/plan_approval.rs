//! Plan Approval Example - plan, review, approve, execute
//!
//! Drives the orchestrator through the full human-in-the-loop round trip
//! using the in-memory collaborators: a first run in plan mode produces a
//! reviewable plan, a second run approves it and the actions execute.
//!
//! Run with: cargo run -p greenlight-core --example plan_approval

use std::sync::Arc;

use serde_json::json;

use greenlight_core::memory::{
    InMemoryPlanStore, RecordingToolRegistry, ScriptedLanguageModel, StaticContextProvider,
};
use greenlight_core::{
    ActionRequest, ActiveMode, ChatTurn, Exploration, Orchestrator, RegistryRouter, RunContext,
    WorkflowConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("greenlight_core=info")
        .init();

    println!("=== Plan approval round trip (greenlight-core) ===\n");

    // 1. In-memory collaborators standing in for production services
    let model = Arc::new(ScriptedLanguageModel::new());
    let data_registry = Arc::new(RecordingToolRegistry::new(&[
        "create_project",
        "create_session",
    ]));
    let workflow_registry = Arc::new(RecordingToolRegistry::new(&[]));
    let plan_store = Arc::new(InMemoryPlanStore::new());
    let context_provider = Arc::new(StaticContextProvider::new(
        json!({"projects": [], "team": ["Sarah", "Marcus"]}),
        json!({}),
    ));

    // Script the exploration the plan run will produce
    model
        .set_explorations(vec![Exploration {
            plan_text: "1. Create project Alpha\n2. Create a kickoff session".to_string(),
            proposed_actions: vec![
                ActionRequest::new("create_project").with_param("name", json!("Alpha")),
                ActionRequest::new("create_session").with_param("projectId", json!("$projectId")),
            ],
        }])
        .await;
    data_registry
        .set_result("create_project", json!({"id": "p1", "name": "Alpha"}))
        .await;
    data_registry
        .set_result("create_session", json!({"id": "s1"}))
        .await;

    let orchestrator = Orchestrator::with_arcs(
        WorkflowConfig::default(),
        model,
        context_provider,
        plan_store.clone(),
        RegistryRouter::new(data_registry.clone(), workflow_registry),
    );

    // 2. First run: plan mode, nothing approved yet
    let request = "Set up the Alpha shoot with a kickoff session";
    println!("User: {request}\n");

    let pending = orchestrator
        .run(
            vec![ChatTurn::user(request)],
            "org-1",
            "user-1",
            RunContext::new().with_active_mode(ActiveMode::PlanMode),
        )
        .await;

    let response = pending.response().expect("plan run produces a response");
    println!("Plan (requires approval = {}):", response.requires_approval);
    println!("{}\n", response.message);
    assert!(response.executed_actions.is_empty());

    let plan = pending.results.plan.as_ref().expect("plan outcome");
    println!(
        "Artifact written to {} (persisted = {})\n",
        plan.artifact_path, plan.persisted
    );

    // 3. Second run: the human approves; the saved actions execute
    println!("User: Looks good, proceed\n");
    let executed = orchestrator
        .run(
            vec![ChatTurn::user("Looks good, proceed")],
            "org-1",
            "user-1",
            RunContext::new()
                .with_active_mode(ActiveMode::PlanMode)
                .with_approved_plan(plan.content.clone(), plan.actions.clone()),
        )
        .await;

    let summary = executed.results.dispatch.as_ref().expect("dispatch ran");
    println!(
        "Executed {} of {} actions ({} failed)",
        summary.successful, summary.total_actions, summary.failed
    );
    for record in &summary.executed {
        println!(
            "  - {} -> {}",
            record.action_type,
            if record.success { "ok" } else { "failed" }
        );
    }

    // The session's $projectId reference resolved to the created project id
    let calls = data_registry.calls().await;
    println!("\ncreate_session params: {}", json!(calls[1].1));

    Ok(())
}
