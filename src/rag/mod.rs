//! RAG (Retrieval-Augmented Generation) for grounded FAQ answers.
//!
//! Evidence filtering, prompt composition and response generation. The
//! orchestrator sequences these stages; nothing here performs retrieval.

pub mod context;
mod generator;
mod prompt;
mod response;

pub use context::{filter_evidence, format_context_for_prompt};
pub use generator::{generator_from_settings, ChatGenerator, DecodingParams, Generator};
pub use prompt::PromptComposer;
pub use response::{CourseMatch, CourseRecommendation, FaqAnswer, FaqLookup, RagResponse};

use crate::vector_store::Match;
use serde::{Deserialize, Serialize};

/// Fallback for a missing FAQ question or course field.
pub const UNKNOWN: &str = "Unknown";
/// Fallback for a missing FAQ answer.
pub const NO_ANSWER: &str = "No answer";
/// Fallback for a missing course description.
pub const NO_DESCRIPTION: &str = "No description";

/// An FAQ pair that cleared the relevance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEvidence {
    pub question: String,
    pub answer: String,
    pub score: f32,
}

impl From<&Match> for FaqEvidence {
    fn from(m: &Match) -> Self {
        Self {
            question: m.metadata_str("question", UNKNOWN),
            answer: m.metadata_str("answer", NO_ANSWER),
            score: m.score,
        }
    }
}
