// Quick-intent classifier
//
// Synchronous keyword pre-filter that runs before any context gathering.
// Relationship/graph-shaped requests only need the cheap minimal snapshot;
// everything else gets the full one. This is a cost-control gate, not a
// correctness gate: a miss just means the more expensive snapshot is used.

/// Which context snapshot variant a request needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentShape {
    /// Relationship/graph query; minimal snapshot suffices
    Graph,
    /// Everything else; full organizational snapshot
    Full,
}

/// Keywords that mark a request as graph/relationship-shaped
const GRAPH_KEYWORDS: &[&str] = &[
    "relationship",
    "graph",
    "connection",
    "connected",
    "up to",
    "doing",
    "working on",
    "what is",
    "map",
    "network",
    "structure",
    "visualization",
];

/// Classify a raw request message. Case-insensitive substring match against
/// the fixed keyword set; first match wins; no match defaults to Full.
pub fn classify_intent(message: &str) -> IntentShape {
    let lowered = message.to_lowercase();
    if GRAPH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        IntentShape::Graph
    } else {
        IntentShape::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_keywords_match_case_insensitively() {
        assert_eq!(
            classify_intent("Show me the RELATIONSHIP between crew members"),
            IntentShape::Graph
        );
        assert_eq!(
            classify_intent("what is Sarah working on?"),
            IntentShape::Graph
        );
        assert_eq!(classify_intent("Map the team structure"), IntentShape::Graph);
    }

    #[test]
    fn test_default_is_full() {
        assert_eq!(
            classify_intent("Create a project called Alpha"),
            IntentShape::Full
        );
        assert_eq!(classify_intent(""), IntentShape::Full);
    }

    #[test]
    fn test_embedded_keyword_matches() {
        // Substring semantics: "doing" inside a larger sentence still matches
        assert_eq!(
            classify_intent("who has been doing the night shifts"),
            IntentShape::Graph
        );
    }
}
