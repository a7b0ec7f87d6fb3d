//! Pipeline orchestrator for Learning Buddy.
//!
//! Sequences embedding, vector search, evidence filtering, prompt
//! composition and generation for each request. Stages run strictly in
//! order; the first failure aborts the request and nothing partial is
//! returned.

use crate::config::{Prompts, RetrievalSettings, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{BuddyError, Result, Stage};
use crate::rag::{
    filter_evidence, generator_from_settings, CourseMatch, CourseRecommendation, FaqAnswer,
    FaqEvidence, FaqLookup, Generator, PromptComposer, RagResponse,
};
use crate::vector_store::{Collection, CollectionIndexes, Match, VectorSearch};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

const READINESS_PROBE: &str = "health check";

/// The main orchestrator for the Learning Buddy pipelines.
///
/// Holds the process-wide service handles, built once at startup and only
/// read afterwards, so one instance can serve concurrent requests.
pub struct Orchestrator {
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn VectorSearch>,
    generator: Arc<dyn Generator>,
    composer: PromptComposer,
    retrieval: RetrievalSettings,
    request_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Validate settings and connect every service handle.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let composer = PromptComposer::new(prompts, &settings.prompts.platform_name);

        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let search = Arc::new(CollectionIndexes::from_settings(&settings.vector_store)?);
        let generator = generator_from_settings(&settings.generation)?;

        info!(
            embedding_model = %settings.embedding.model,
            vector_store = %settings.vector_store.provider,
            generation = %settings.generation.provider,
            "Pipeline services initialized"
        );

        Ok(Self::with_components(
            embedder,
            search,
            generator,
            composer,
            settings.retrieval.clone(),
        )
        .with_request_timeout(settings.pipeline.request_timeout_secs.map(Duration::from_secs)))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn VectorSearch>,
        generator: Arc<dyn Generator>,
        composer: PromptComposer,
        retrieval: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            search,
            generator,
            composer,
            retrieval,
            request_timeout: None,
        }
    }

    /// Bound every request by a deadline covering all of its external calls.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Embed a probe text once so an unreachable or misconfigured embedding
    /// service fails startup instead of the first request.
    pub async fn check_ready(&self) -> Result<()> {
        let vector = bounded(
            self.deadline(),
            Stage::Embed,
            self.embedder.embed(READINESS_PROBE),
        )
        .await
        .map_err(|e| BuddyError::Config(format!("Embedding service not ready: {}", e)))?;

        info!(dimensions = vector.len(), "Embedding service ready");
        Ok(())
    }

    /// Recommend courses for each interest area.
    ///
    /// Every area is checked before any call; a blank area is rejected as
    /// invalid input. Areas are then processed one after another. Matches
    /// are returned as the index ranked them, without threshold filtering.
    /// The first failure fails the whole batch.
    #[instrument(skip(self, areas), fields(areas = areas.len()))]
    pub async fn recommend_courses(&self, areas: &[String]) -> Result<Vec<CourseRecommendation>> {
        let result = self.recommend_courses_inner(areas).await;
        result.inspect_err(|e| log_failure("recommend-courses", e))
    }

    async fn recommend_courses_inner(&self, areas: &[String]) -> Result<Vec<CourseRecommendation>> {
        let trimmed = areas
            .iter()
            .map(|area| validate(area, "Interest area"))
            .collect::<Result<Vec<_>>>()?;

        let deadline = self.deadline();
        let mut results = Vec::with_capacity(areas.len());

        for (area, text) in areas.iter().zip(trimmed) {
            let matches = self
                .retrieve(text, Collection::Courses, self.retrieval.course_top_k, deadline)
                .await?;
            results.push(CourseRecommendation {
                area: area.clone(),
                courses: matches.iter().map(CourseMatch::from).collect(),
            });
        }

        Ok(results)
    }

    /// Return the top FAQ matches for a question, unfiltered.
    ///
    /// A blank question is rejected as invalid input before any call.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn lookup_faq(&self, question: &str) -> Result<FaqLookup> {
        let result = self.lookup_faq_inner(question).await;
        result.inspect_err(|e| log_failure("faq", e))
    }

    async fn lookup_faq_inner(&self, question: &str) -> Result<FaqLookup> {
        let text = validate(question, "Question")?;
        let matches = self
            .retrieve(text, Collection::Faq, self.retrieval.faq_top_k, self.deadline())
            .await?;

        Ok(FaqLookup {
            question: question.to_string(),
            answers: matches.iter().map(FaqAnswer::from).collect(),
        })
    }

    /// Answer a free-text query grounded in FAQ evidence.
    ///
    /// With no evidence above the threshold the model is still called; the
    /// prompt instructs it to answer generally or refuse.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn answer(&self, query: &str) -> Result<RagResponse> {
        let result = self.answer_inner(query).await;
        result.inspect_err(|e| log_failure("retrieve-faq-and-respond", e))
    }

    async fn answer_inner(&self, query: &str) -> Result<RagResponse> {
        let query = validate(query, "Query")?;
        let deadline = self.deadline();

        let matches = self
            .retrieve(query, Collection::Faq, self.retrieval.rag_top_k, deadline)
            .await?;

        let evidence: Vec<FaqEvidence> = filter_evidence(matches, self.retrieval.min_score)
            .iter()
            .map(FaqEvidence::from)
            .collect();
        debug!(
            evidence = evidence.len(),
            threshold = self.retrieval.min_score,
            "Filtered evidence"
        );

        let prompt = self.composer.compose(query, &evidence);
        let response = bounded(deadline, Stage::Generate, self.generator.generate(&prompt)).await?;

        info!(evidence = evidence.len(), "Generated grounded response");
        Ok(RagResponse {
            response,
            faqs: evidence,
        })
    }

    async fn retrieve(
        &self,
        text: &str,
        collection: Collection,
        top_k: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<Match>> {
        let vector = bounded(deadline, Stage::Embed, self.embedder.embed(text)).await?;
        let matches = bounded(
            deadline,
            Stage::Retrieve,
            self.search.search(&vector, collection, top_k),
        )
        .await?;
        debug!(collection = %collection, matches = matches.len(), "Retrieved matches");
        Ok(matches)
    }

    fn deadline(&self) -> Option<Instant> {
        self.request_timeout.map(|t| Instant::now() + t)
    }
}

/// Trim caller text and reject it when nothing is left.
fn validate<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BuddyError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}

async fn bounded<T, F>(deadline: Option<Instant>, stage: Stage, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut)
            .await
            .map_err(|_| BuddyError::Timeout { stage })?,
        None => fut.await,
    }
}

fn log_failure(operation: &str, err: &BuddyError) {
    let stage = err.stage().map(|s| s.to_string()).unwrap_or_default();
    error!(
        operation,
        stage = %stage,
        kind = ?err.kind(),
        "Error in {}: {}",
        operation,
        err
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims() {
        assert_eq!(validate("  refunds \n", "Query").unwrap(), "refunds");
    }

    #[test]
    fn test_validate_rejects_blank() {
        for input in ["", "   ", "\t\n"] {
            let err = validate(input, "Query").unwrap_err();
            assert!(err.is_client_error());
            assert_eq!(err.to_string(), "Invalid input: Query cannot be empty");
        }
    }

    #[tokio::test]
    async fn test_bounded_times_out_with_stage() {
        let deadline = Some(Instant::now() + Duration::from_millis(20));
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, BuddyError>(())
        };

        let err = bounded(deadline, Stage::Retrieve, slow).await.unwrap_err();
        assert!(matches!(err, BuddyError::Timeout { stage: Stage::Retrieve }));
    }

    #[tokio::test]
    async fn test_bounded_without_deadline_passes_through() {
        let value = bounded(None, Stage::Embed, async { Ok::<_, BuddyError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
