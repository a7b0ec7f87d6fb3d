//! Pipeline result payloads.

use super::{FaqEvidence, NO_ANSWER, NO_DESCRIPTION, UNKNOWN};
use crate::vector_store::Match;
use serde::{Deserialize, Serialize};

/// A catalog course matched to an interest area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMatch {
    pub id: String,
    pub score: f32,
    pub course_name: String,
    pub category: String,
    /// Course description.
    pub text: String,
}

impl From<&Match> for CourseMatch {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            score: m.score,
            course_name: m.metadata_str("course_name", UNKNOWN),
            category: m.metadata_str("category", UNKNOWN),
            text: m.metadata_str("text", NO_DESCRIPTION),
        }
    }
}

/// Courses recommended for one interest area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub area: String,
    pub courses: Vec<CourseMatch>,
}

/// A stored FAQ pair returned by a plain lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqAnswer {
    pub id: String,
    pub score: f32,
    pub question: String,
    pub answer: String,
}

impl From<&Match> for FaqAnswer {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            score: m.score,
            question: m.metadata_str("question", UNKNOWN),
            answer: m.metadata_str("answer", NO_ANSWER),
        }
    }
}

/// Top FAQ matches for a question, unfiltered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqLookup {
    pub question: String,
    pub answers: Vec<FaqAnswer>,
}

/// A generated answer with the evidence that grounded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    /// The generated answer.
    pub response: String,
    /// FAQ pairs above the relevance threshold. Empty when nothing matched.
    pub faqs: Vec<FaqEvidence>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.response.clone();

        if !self.faqs.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for faq in &self.faqs {
                output.push_str(&format!("\n{} (score: {:.2})", faq.question, faq.score));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matched(metadata: serde_json::Value) -> Match {
        serde_json::from_value(json!({ "id": "m1", "score": 0.92, "metadata": metadata })).unwrap()
    }

    #[test]
    fn test_course_defaults() {
        let course = CourseMatch::from(&matched(json!({ "course_name": "Intro to ML" })));

        assert_eq!(course.course_name, "Intro to ML");
        assert_eq!(course.category, "Unknown");
        assert_eq!(course.text, "No description");
        assert_eq!(course.score, 0.92);
    }

    #[test]
    fn test_faq_defaults() {
        let faq = FaqAnswer::from(&matched(json!({})));
        assert_eq!(faq.question, "Unknown");
        assert_eq!(faq.answer, "No answer");

        let evidence = FaqEvidence::from(&matched(json!({ "answer": "Yes." })));
        assert_eq!(evidence.question, "Unknown");
        assert_eq!(evidence.answer, "Yes.");
    }

    #[test]
    fn test_display_lists_sources() {
        let response = RagResponse {
            response: "Refunds take 30 days.".to_string(),
            faqs: vec![FaqEvidence {
                question: "Refund policy?".to_string(),
                answer: "30 days.".to_string(),
                score: 0.85,
            }],
        };
        let text = response.format_for_display();
        assert!(text.starts_with("Refunds take 30 days."));
        assert!(text.contains("Refund policy? (score: 0.85)"));

        let bare = RagResponse {
            response: "I can only help with learning topics.".to_string(),
            faqs: Vec::new(),
        };
        assert_eq!(bare.format_for_display(), "I can only help with learning topics.");
    }
}
