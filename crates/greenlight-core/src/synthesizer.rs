// Response synthesis: one user-facing result from whichever nodes ran
//
// Pure merge over NodeResults, no side effects, idempotent for the same
// input. An approval-pending run must never report a side effect as having
// happened, so that branch always returns an empty executed list.

use serde::{Deserialize, Serialize};

use greenlight_contracts::ActionRecord;

use crate::state::NodeResults;

/// The merged, user-facing result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedResponse {
    /// Always present, even on failure
    pub message: String,
    /// True when a plan is pending human approval
    pub requires_approval: bool,
    /// Plan document, when one was produced this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_content: Option<String>,
    /// Actions executed this run (empty while approval is pending)
    #[serde(default)]
    pub executed_actions: Vec<ActionRecord>,
}

/// Merge node results into one response.
///
/// Priority: approval-pending plan, then dispatch results, then a ReAct
/// answer, then a direct LLM response, then a generic completion message.
pub fn synthesize(results: &NodeResults) -> SynthesizedResponse {
    if results.waiting_for_approval {
        let plan_content = results.plan.as_ref().map(|p| p.content.clone());
        let message = plan_content
            .clone()
            .unwrap_or_else(|| "A plan is ready for your review.".to_string());
        return SynthesizedResponse {
            message,
            requires_approval: true,
            plan_content,
            executed_actions: Vec::new(),
        };
    }

    if let Some(dispatch) = &results.dispatch {
        let analysis_text = results
            .analysis
            .as_ref()
            .map(|a| a.response_text.as_str())
            .unwrap_or("");
        let mut message = if analysis_text.is_empty() {
            format!(
                "Completed {} of {} actions.",
                dispatch.successful, dispatch.total_actions
            )
        } else {
            analysis_text.to_string()
        };
        if dispatch.failed > 0 {
            let failures: Vec<String> = dispatch
                .executed
                .iter()
                .filter(|r| !r.success)
                .map(|r| {
                    format!(
                        "{}: {}",
                        r.action_type,
                        r.error.as_deref().unwrap_or("unknown error")
                    )
                })
                .collect();
            message.push_str(&format!(" {} action(s) failed: {}", dispatch.failed, failures.join("; ")));
        }
        return SynthesizedResponse {
            message,
            requires_approval: false,
            plan_content: None,
            executed_actions: dispatch.executed.clone(),
        };
    }

    if let Some(react) = &results.react {
        return SynthesizedResponse {
            message: react.answer.clone(),
            requires_approval: false,
            plan_content: None,
            executed_actions: Vec::new(),
        };
    }

    if let Some(analysis) = &results.analysis {
        if !analysis.response_text.is_empty() {
            return SynthesizedResponse {
                message: analysis.response_text.clone(),
                requires_approval: false,
                plan_content: None,
                executed_actions: Vec::new(),
            };
        }
    }

    SynthesizedResponse {
        message: "Request completed.".to_string(),
        requires_approval: false,
        plan_content: None,
        executed_actions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::state::PlanOutcome;
    use greenlight_contracts::{DispatchSummary, ReActOutcome};

    #[test]
    fn test_approval_pending_reports_no_side_effects() {
        let results = NodeResults {
            waiting_for_approval: true,
            plan: Some(PlanOutcome {
                content: "1. Create the project".to_string(),
                actions: vec![],
                artifact_path: "plans/current-plan.md".to_string(),
                persisted: true,
            }),
            ..Default::default()
        };
        let response = synthesize(&results);
        assert!(response.requires_approval);
        assert!(response.executed_actions.is_empty());
        assert_eq!(response.message, "1. Create the project");
    }

    #[test]
    fn test_react_answer_used_when_no_dispatch() {
        let results = NodeResults {
            react: Some(ReActOutcome {
                success: true,
                answer: "Two projects are active.".to_string(),
                iterations: 1,
                steps: vec![],
            }),
            ..Default::default()
        };
        assert_eq!(synthesize(&results).message, "Two projects are active.");
    }

    #[test]
    fn test_direct_llm_response_fallback() {
        let results = NodeResults {
            analysis: Some(Analysis {
                response_text: "Here is what I found.".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(synthesize(&results).message, "Here is what I found.");
    }

    #[test]
    fn test_generic_completion_when_nothing_ran() {
        assert_eq!(
            synthesize(&NodeResults::default()).message,
            "Request completed."
        );
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let results = NodeResults {
            dispatch: Some(DispatchSummary::default()),
            ..Default::default()
        };
        assert_eq!(synthesize(&results), synthesize(&results));
    }
}
