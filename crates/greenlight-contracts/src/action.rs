// Action descriptors and dispatch records
//
// An ActionRequest is an opaque {type, params} descriptor: it is not bound
// to a specific tool registry until the dispatch node resolves it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single requested tool invocation, not yet bound to a registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRequest {
    /// Action type, e.g. "create_project" or "assign_crew"
    #[serde(rename = "type")]
    pub action_type: String,
    /// Parameters; string values starting with `$` are variable references
    /// resolved against earlier action results at dispatch time
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Outcome of one dispatched action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    /// Action type that was dispatched
    pub action_type: String,
    /// Parameters after variable resolution and auto-fill
    pub params: Map<String, Value>,
    /// Whether the registry reported success
    pub success: bool,
    /// Result data on success (or partial data on failure, if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the action finished executing
    pub executed_at: DateTime<Utc>,
}

impl ActionRecord {
    /// Record a successful action
    pub fn success(action_type: impl Into<String>, params: Map<String, Value>, data: Option<Value>) -> Self {
        Self {
            action_type: action_type.into(),
            params,
            success: true,
            data,
            error: None,
            executed_at: Utc::now(),
        }
    }

    /// Record a failed action; `data` carries any partial result
    pub fn failure(
        action_type: impl Into<String>,
        params: Map<String, Value>,
        error: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            action_type: action_type.into(),
            params,
            success: false,
            data,
            error: Some(error.into()),
            executed_at: Utc::now(),
        }
    }
}

/// Aggregate result of one dispatch call
///
/// One action's failure never prevents subsequent actions from running, so
/// `executed` always has `total_actions` entries and failures are reported
/// together at the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DispatchSummary {
    /// Per-action records, in dispatch order
    pub executed: Vec<ActionRecord>,
    /// Number of actions in the dispatched list
    pub total_actions: usize,
    /// Count of successful actions
    pub successful: usize,
    /// Count of failed actions
    pub failed: usize,
}

impl DispatchSummary {
    /// Build a summary from per-action records
    pub fn from_records(executed: Vec<ActionRecord>) -> Self {
        let total_actions = executed.len();
        let successful = executed.iter().filter(|r| r.success).count();
        Self {
            failed: total_actions - successful,
            executed,
            total_actions,
            successful,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_request_deserializes_type_field() {
        let json = r#"{"type": "create_project", "params": {"name": "Alpha"}}"#;
        let action: ActionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(action.action_type, "create_project");
        assert_eq!(action.params["name"], "Alpha");
    }

    #[test]
    fn test_action_request_params_default_empty() {
        let action: ActionRequest = serde_json::from_str(r#"{"type": "list_projects"}"#).unwrap();
        assert!(action.params.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            ActionRecord::success("a", Map::new(), Some(json!({"id": 1}))),
            ActionRecord::failure("b", Map::new(), "boom", None),
            ActionRecord::success("c", Map::new(), None),
        ];
        let summary = DispatchSummary::from_records(records);
        assert_eq!(summary.total_actions, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
    }
}
