//! Evidence selection and rendering for RAG prompts.

use super::FaqEvidence;
use crate::config::Prompts;
use crate::vector_store::Match;
use std::collections::HashMap;

/// Keep matches scoring strictly above `threshold`, preserving order.
///
/// An empty result is a normal outcome meaning no grounding was found.
pub fn filter_evidence(matches: Vec<Match>, threshold: f32) -> Vec<Match> {
    matches.into_iter().filter(|m| m.score > threshold).collect()
}

/// Render evidence as labeled question/answer pairs, one per item, in order.
///
/// `line` is the per-item template with `{{question}}` and `{{answer}}`
/// placeholders. Empty evidence renders as an empty string.
pub fn format_context_for_prompt(evidence: &[FaqEvidence], line: &str) -> String {
    evidence
        .iter()
        .map(|item| {
            let mut vars = HashMap::new();
            vars.insert("question".to_string(), item.question.clone());
            vars.insert("answer".to_string(), item.answer.clone());
            Prompts::render(line, &vars)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagPrompts;

    fn scored(id: &str, score: f32) -> Match {
        Match {
            id: id.to_string(),
            score,
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let matches = vec![scored("a", 0.65), scored("b", 0.71), scored("c", 0.7)];
        let kept = filter_evidence(matches, 0.7);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn test_filter_preserves_order() {
        let matches = vec![
            scored("a", 0.9),
            scored("b", 0.2),
            scored("c", 0.95),
            scored("d", 0.75),
        ];
        let ids: Vec<String> = filter_evidence(matches, 0.7).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_evidence(Vec::new(), 0.7).is_empty());
    }

    #[test]
    fn test_format_context() {
        let evidence = vec![
            FaqEvidence {
                question: "How do refunds work?".to_string(),
                answer: "Full refund within 30 days.".to_string(),
                score: 0.9,
            },
            FaqEvidence {
                question: "Can I pause a course?".to_string(),
                answer: "Yes, from your dashboard.".to_string(),
                score: 0.8,
            },
        ];

        let text = format_context_for_prompt(&evidence, &RagPrompts::default().evidence);
        assert_eq!(
            text,
            "Q: How do refunds work?\nA: Full refund within 30 days.\nQ: Can I pause a course?\nA: Yes, from your dashboard."
        );
        assert_eq!(format_context_for_prompt(&[], &RagPrompts::default().evidence), "");
    }
}
