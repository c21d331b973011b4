// Context snapshot
//
// An opaque, externally-produced grounding payload describing organizational
// state (projects, budgets, team, licensing, ...). The core passes it through
// to the LLM capability unmodified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque organizational context snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ContextSnapshot(pub Value);

impl ContextSnapshot {
    /// Empty snapshot (no organizational grounding)
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ContextSnapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
