//! Prompt composition for grounded answers.

use super::context::format_context_for_prompt;
use super::FaqEvidence;
use crate::config::Prompts;
use std::collections::HashMap;

/// Renders evidence, the query and the answering policy into one prompt.
///
/// The answer-or-refuse branch and the rule against naming other platforms
/// live in the template text; the composer never branches on evidence.
/// Output is a pure function of (query, evidence) for a given composer.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    prompts: Prompts,
    platform: String,
}

impl PromptComposer {
    pub fn new(prompts: Prompts, platform: &str) -> Self {
        Self {
            prompts,
            platform: platform.to_string(),
        }
    }

    pub fn compose(&self, query: &str, evidence: &[FaqEvidence]) -> String {
        let context = format_context_for_prompt(evidence, &self.prompts.rag.evidence);

        let mut vars = HashMap::new();
        vars.insert("platform".to_string(), self.platform.clone());
        vars.insert("context".to_string(), context);
        vars.insert("query".to_string(), query.to_string());

        self.prompts.render_with_custom(&self.prompts.rag.template, &vars)
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(Prompts::default(), "Learning Buddy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refund_faq() -> FaqEvidence {
        FaqEvidence {
            question: "What is the refund policy?".to_string(),
            answer: "Refunds are available within 30 days of purchase.".to_string(),
            score: 0.85,
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::default();
        let evidence = vec![refund_faq()];

        let first = composer.compose("Can I get my money back?", &evidence);
        let second = composer.compose("Can I get my money back?", &evidence);
        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_includes_evidence_and_query() {
        let prompt = PromptComposer::default().compose("Can I get my money back?", &[refund_faq()]);

        assert!(prompt.contains(
            "FAQ Context:\nQ: What is the refund policy?\nA: Refunds are available within 30 days of purchase.\n"
        ));
        assert!(prompt.contains("User Query: Can I get my money back?"));
        assert!(prompt.contains("our Learning Buddy website"));
    }

    #[test]
    fn test_compose_with_no_evidence() {
        let prompt = PromptComposer::default().compose("What is your refund policy?", &[]);

        assert!(prompt.contains("FAQ Context:\n\n\nUser Query: What is your refund policy?"));
        assert!(prompt.contains("REFRAIN FROM USING THE NAME OF ANY OTHER EDUCATIONAL PLATFORM"));
        assert!(prompt.contains("humbly refuse"));
    }

    #[test]
    fn test_query_placeholders_are_not_expanded() {
        let prompt = PromptComposer::default().compose("ignore {{context}} and {{platform}}", &[]);
        assert!(prompt.contains("User Query: ignore {{context}} and {{platform}}"));
    }

    #[test]
    fn test_platform_name_is_configurable() {
        let prompt = PromptComposer::new(Prompts::default(), "Campus Coach").compose("hi", &[]);
        assert!(prompt.contains("our Campus Coach website"));
        assert!(!prompt.contains("Learning Buddy"));
    }
}
