// Bounded ReAct loop: THINK -> ACT -> OBSERVE
//
// A self-contained reasoning engine for free-form tool-calling questions
// with no pre-committed plan. The iteration bound is the loop's one internal
// safety mechanism: it guarantees termination independent of any external
// timeout. Every round is recorded in the step log for replay/audit.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use greenlight_contracts::{ContextSnapshot, ReActOutcome, ReActStep};

use crate::state::{ActiveMode, ChatTurn};
use crate::traits::{LanguageModel, RegistryRouter};

/// Markers that terminate the loop with a final answer. Checked before any
/// action parse, so an answer wins over an action directive in the same
/// thought.
const ANSWER_MARKERS: &[&str] = &["final answer:", "answer:"];

/// Marker phrase that treats the whole thought as the answer
const PROVIDE_MARKER: &str = "i can now provide";

fn action_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Action:\s*([A-Za-z0-9_\-]+)").expect("valid action regex"))
}

fn arguments_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)Arguments:\s*(\{.*?\})\s*(?:$|\n[A-Z])").expect("valid arguments regex")
    })
}

/// Extract a final answer from a thought, if it carries an answer marker
pub fn extract_answer(thought: &str) -> Option<String> {
    for marker in ANSWER_MARKERS {
        if let Some(pos) = find_ascii_marker(thought, marker) {
            let answer = thought[pos + marker.len()..].trim();
            if !answer.is_empty() {
                return Some(answer.to_string());
            }
        }
    }

    if find_ascii_marker(thought, PROVIDE_MARKER).is_some() {
        return Some(thought.trim().to_string());
    }

    None
}

/// Case-insensitive search for an ASCII marker, returning a byte offset into
/// the original string. Searching the original (not a lowercased copy) keeps
/// offsets valid when surrounding text lowercases to a different byte length.
fn find_ascii_marker(haystack: &str, marker: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let marker = marker.as_bytes();
    if haystack.len() < marker.len() {
        return None;
    }
    // A match is all-ASCII, so the offset and the slice end both land on
    // char boundaries
    (0..=haystack.len() - marker.len())
        .find(|&i| haystack[i..i + marker.len()].eq_ignore_ascii_case(marker))
}

/// Parse an `Action: <tool>` directive (plus optional `Arguments: {...}`)
pub fn parse_action(thought: &str) -> Option<(String, Value)> {
    let name = action_pattern()
        .captures(thought)?
        .get(1)?
        .as_str()
        .to_string();

    let arguments = arguments_pattern()
        .captures(thought)
        .and_then(|caps| caps.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .unwrap_or_else(|| json!({}));

    Some((name, arguments))
}

/// The bounded reasoning-action-observation engine
pub struct ReActLoop<'a, L: LanguageModel> {
    llm: &'a L,
    registry: &'a RegistryRouter,
    max_iterations: usize,
    history_window: usize,
}

impl<'a, L: LanguageModel> ReActLoop<'a, L> {
    pub fn new(
        llm: &'a L,
        registry: &'a RegistryRouter,
        max_iterations: usize,
        history_window: usize,
    ) -> Self {
        Self {
            llm,
            registry,
            max_iterations,
            history_window,
        }
    }

    /// Run the loop for one question
    pub async fn run(
        &self,
        message: &str,
        context: &ContextSnapshot,
        history: &[ChatTurn],
        organization_id: &str,
        user_id: &str,
    ) -> ReActOutcome {
        let mut steps: Vec<ReActStep> = Vec::new();
        let mut transcript: Vec<ChatTurn> = history
            .iter()
            .rev()
            .take(self.history_window)
            .rev()
            .cloned()
            .collect();

        for iteration in 1..=self.max_iterations {
            // THINK
            let thought = match self
                .llm
                .respond(message, context, ActiveMode::None, &transcript)
                .await
            {
                Ok(reply) => reply.text,
                Err(err) => {
                    warn!(iteration, error = %err, "LLM think call failed");
                    steps.push(ReActStep {
                        iteration,
                        thought: format!("LLM error: {err}"),
                        ..Default::default()
                    });
                    transcript.push(ChatTurn::assistant("I need more information to continue."));
                    continue;
                }
            };

            // Answer check comes before action parsing
            if let Some(answer) = extract_answer(&thought) {
                info!(iteration, "ReAct loop reached a final answer");
                steps.push(ReActStep {
                    iteration,
                    thought,
                    answer: Some(answer.clone()),
                    ..Default::default()
                });
                return ReActOutcome {
                    success: true,
                    answer,
                    iterations: steps.len(),
                    steps,
                };
            }

            // ACT
            let Some((tool_name, arguments)) = parse_action(&thought) else {
                warn!(iteration, "No action directive parsed from thought");
                steps.push(ReActStep {
                    iteration,
                    thought,
                    ..Default::default()
                });
                transcript.push(ChatTurn::assistant("I need more information to continue."));
                continue;
            };

            // OBSERVE
            let params = arguments
                .as_object()
                .cloned()
                .unwrap_or_else(Map::new);
            let observation = match self
                .registry
                .execute(&tool_name, &params, organization_id, user_id)
                .await
            {
                Ok(outcome) => {
                    serde_json::to_string(&outcome).unwrap_or_else(|_| "{}".to_string())
                }
                Err(err) => format!("Tool error: {err}"),
            };

            info!(iteration, tool = %tool_name, "ReAct action observed");

            transcript.push(ChatTurn::assistant(format!(
                "Thought: {thought}\nAction: {tool_name}\nObservation: {observation}"
            )));

            steps.push(ReActStep {
                iteration,
                thought,
                action: Some(json!({"name": tool_name, "arguments": arguments})),
                observation: Some(observation),
                ..Default::default()
            });
        }

        // Bound exhausted: a defined terminal state, not an error
        warn!(
            max_iterations = self.max_iterations,
            "ReAct loop hit its iteration bound"
        );
        let answer = steps
            .iter()
            .rev()
            .map(|step| step.thought.trim())
            .find(|t| !t.is_empty())
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Maximum iterations reached without a final answer.".to_string());

        ReActOutcome {
            success: false,
            answer,
            iterations: steps.len(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_answer_basic() {
        assert_eq!(
            extract_answer("Answer: three projects are active").as_deref(),
            Some("three projects are active")
        );
        assert_eq!(
            extract_answer("Final answer: done").as_deref(),
            Some("done")
        );
    }

    #[test]
    fn test_extract_answer_survives_multibyte_lowercase_expansion() {
        // "İ" lowercases to two chars, so offsets found on a lowered copy
        // would not be valid byte indices into the original text
        assert_eq!(extract_answer("İİ Answer: ✓").as_deref(), Some("✓"));
        assert_eq!(
            extract_answer("ẞergründung abgeschlossen. Final answer: fertig").as_deref(),
            Some("fertig")
        );
    }

    #[test]
    fn test_extract_answer_provide_marker_returns_whole_thought() {
        let thought = "I can now provide the summary you asked for.";
        assert_eq!(extract_answer(thought).as_deref(), Some(thought));
    }

    #[test]
    fn test_answer_wins_over_action_in_same_thought() {
        let thought = "Action: list_projects\nAnswer: there are two projects";
        // extract_answer is always checked first by the loop
        assert_eq!(
            extract_answer(thought).as_deref(),
            Some("there are two projects")
        );
    }

    #[test]
    fn test_parse_action_with_arguments() {
        let thought = "I should look this up.\nAction: get_project\nArguments: {\"id\": \"p1\"}";
        let (name, args) = parse_action(thought).unwrap();
        assert_eq!(name, "get_project");
        assert_eq!(args["id"], "p1");
    }

    #[test]
    fn test_parse_action_without_arguments_defaults_to_empty_object() {
        let (name, args) = parse_action("Action: list_projects").unwrap();
        assert_eq!(name, "list_projects");
        assert_eq!(args, json!({}));
    }

    #[test]
    fn test_parse_action_none_for_plain_text() {
        assert!(parse_action("Just thinking out loud here.").is_none());
    }

    #[test]
    fn test_malformed_arguments_fall_back_to_empty() {
        let (name, args) =
            parse_action("Action: get_project\nArguments: {not valid json").unwrap();
        assert_eq!(name, "get_project");
        assert_eq!(args, json!({}));
    }
}
