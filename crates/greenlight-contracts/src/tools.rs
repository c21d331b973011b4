// Tool registry result shape
//
// Both capability providers (the data registry and the workflow-function
// registry) return this uniform success/error shape from `execute`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one registry `execute` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutcome {
    /// Whether the operation succeeded
    pub success: bool,
    /// Result data (success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message (failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Successful outcome with data
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed outcome with an error message
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization_omits_absent_fields() {
        let outcome = ToolOutcome::ok(json!({"id": "p1"}));
        let serialized = serde_json::to_string(&outcome).unwrap();
        assert!(!serialized.contains("error"));

        let outcome = ToolOutcome::err("not found");
        let serialized = serde_json::to_string(&outcome).unwrap();
        assert!(!serialized.contains("data"));
    }
}
