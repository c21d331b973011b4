// Action dispatch: strictly sequential tool invocation with inter-step
// variable resolution and continue-on-error failure isolation.
//
// Actions run one at a time, in list order, because a later action's params
// may reference an earlier action's result. One action's failure never
// prevents subsequent actions from running; all failures are reported
// together in the summary.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{info, warn};

use greenlight_contracts::{ActionRecord, ActionRequest, DispatchSummary};

use crate::state::RunContext;
use crate::traits::RegistryRouter;

/// Variable reference sentinel: `"$projectId"` resolves against the store
const VARIABLE_PREFIX: char = '$';

/// Entity names with well-known alias keys in the result store
const ALIASED_ENTITIES: &[(&str, &str)] = &[
    ("project", "projectId"),
    ("session", "sessionId"),
    ("call_sheet", "callSheetId"),
    ("task", "taskId"),
    ("budget", "budgetId"),
];

/// Ephemeral per-dispatch mapping from variable name to resolved value
///
/// Seeded with known context values and grown as each action completes.
/// Created fresh per dispatch call and discarded at end of run; never
/// persisted or shared.
#[derive(Debug, Default)]
pub struct ActionResultStore {
    values: HashMap<String, Value>,
}

impl ActionResultStore {
    /// Seed the store from run context
    pub fn from_context(context: &RunContext) -> Self {
        let mut values = HashMap::new();
        if let Some(project_id) = &context.project_id {
            values.insert("projectId".to_string(), Value::String(project_id.clone()));
        }
        if let Some(session_id) = &context.session_id {
            values.insert("sessionId".to_string(), Value::String(session_id.clone()));
        }
        Self { values }
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Resolve `$name` references in params against the store
    ///
    /// Unresolved references are logged and passed through as literals; a
    /// missing variable is a warning, never an error.
    pub fn resolve(&self, action_type: &str, params: &Map<String, Value>) -> Map<String, Value> {
        let mut resolved = Map::new();
        for (key, value) in params {
            let out = match value.as_str().and_then(strip_variable_prefix) {
                Some(var_name) => match self.values.get(var_name) {
                    Some(resolved_value) => resolved_value.clone(),
                    None => {
                        warn!(
                            action_type = %action_type,
                            variable = %var_name,
                            "Unresolved variable reference, passing literal through"
                        );
                        value.clone()
                    }
                },
                None => value.clone(),
            };
            resolved.insert(key.clone(), out);
        }
        resolved
    }

    /// Merge a completed action's result under the well-known keys
    ///
    /// Stores `{type}`, `{type}_result`, `{type}_id` (when the result carries
    /// an `id`), and any entity alias inferred from the action type.
    pub fn record(&mut self, action_type: &str, data: &Value) {
        self.values.insert(action_type.to_string(), data.clone());
        self.values
            .insert(format!("{action_type}_result"), data.clone());

        if let Some(id) = data.get("id") {
            self.values.insert(format!("{action_type}_id"), id.clone());

            for (entity, alias) in ALIASED_ENTITIES {
                if action_type.contains(entity) {
                    self.values.insert((*alias).to_string(), id.clone());
                }
            }
        }
    }
}

fn strip_variable_prefix(value: &str) -> Option<&str> {
    value.strip_prefix(VARIABLE_PREFIX).filter(|s| !s.is_empty())
}

/// Dispatch an ordered action list through the registry router
///
/// Never parallel: later actions may reference earlier results. Registry
/// errors (thrown or reported) become per-action failure records and the
/// loop continues to the next action.
pub async fn dispatch_actions(
    router: &RegistryRouter,
    actions: &[ActionRequest],
    context: &RunContext,
    organization_id: &str,
    user_id: &str,
) -> DispatchSummary {
    let mut store = ActionResultStore::from_context(context);
    let mut executed = Vec::with_capacity(actions.len());

    for action in actions {
        let mut params = store.resolve(&action.action_type, &action.params);

        // Auto-fill the currently-selected project when the action omits one
        if !params.contains_key("projectId") {
            if let Some(project_id) = store.get("projectId") {
                params.insert("projectId".to_string(), project_id.clone());
            }
        }

        info!(
            action_type = %action.action_type,
            organization_id = %organization_id,
            "Dispatching action"
        );

        let record = match router
            .execute(&action.action_type, &params, organization_id, user_id)
            .await
        {
            Ok(outcome) if outcome.success => {
                let data = outcome.data.unwrap_or(Value::Null);
                store.record(&action.action_type, &data);
                ActionRecord::success(&action.action_type, params, Some(data))
            }
            Ok(outcome) => {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "Tool reported failure".to_string());
                warn!(
                    action_type = %action.action_type,
                    error = %error,
                    "Action failed, continuing with remaining actions"
                );
                ActionRecord::failure(&action.action_type, params, error, outcome.data)
            }
            Err(err) => {
                warn!(
                    action_type = %action.action_type,
                    error = %err,
                    "Registry call failed, continuing with remaining actions"
                );
                ActionRecord::failure(&action.action_type, params, err.to_string(), None)
            }
        };

        executed.push(record);
    }

    let summary = DispatchSummary::from_records(executed);
    info!(
        total = summary.total_actions,
        successful = summary.successful,
        failed = summary.failed,
        "Dispatch complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(values: &[(&str, Value)]) -> ActionResultStore {
        let mut store = ActionResultStore::default();
        for (k, v) in values {
            store.values.insert((*k).to_string(), v.clone());
        }
        store
    }

    #[test]
    fn test_resolve_replaces_known_variable() {
        let store = store_with(&[("projectId", json!("p1"))]);
        let mut params = Map::new();
        params.insert("projectId".to_string(), json!("$projectId"));
        params.insert("name".to_string(), json!("Night shoot"));

        let resolved = store.resolve("create_session", &params);
        assert_eq!(resolved["projectId"], json!("p1"));
        assert_eq!(resolved["name"], json!("Night shoot"));
    }

    #[test]
    fn test_resolve_leaves_unknown_variable_as_literal() {
        let store = ActionResultStore::default();
        let mut params = Map::new();
        params.insert("ref".to_string(), json!("$missing"));

        let resolved = store.resolve("update_task", &params);
        assert_eq!(resolved["ref"], json!("$missing"));
    }

    #[test]
    fn test_record_stores_type_keys_and_alias() {
        let mut store = ActionResultStore::default();
        store.record("create_project", &json!({"id": "p1", "name": "Alpha"}));

        assert_eq!(store.get("create_project_id"), Some(&json!("p1")));
        assert_eq!(store.get("projectId"), Some(&json!("p1")));
        assert!(store.get("create_project_result").is_some());
    }

    #[test]
    fn test_record_call_sheet_alias() {
        let mut store = ActionResultStore::default();
        store.record("create_call_sheet", &json!({"id": "cs-9"}));
        assert_eq!(store.get("callSheetId"), Some(&json!("cs-9")));
    }

    #[test]
    fn test_bare_dollar_is_not_a_reference() {
        let store = ActionResultStore::default();
        let mut params = Map::new();
        params.insert("amount".to_string(), json!("$"));
        let resolved = store.resolve("set_budget", &params);
        assert_eq!(resolved["amount"], json!("$"));
    }
}
