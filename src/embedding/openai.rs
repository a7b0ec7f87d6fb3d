//! OpenAI-compatible embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{BuddyError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// Works against OpenAI itself or any server speaking the same protocol,
/// such as a local sentence-transformers deployment.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from an existing client.
    pub fn with_client(client: Client<OpenAIConfig>, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }

    /// Create an embedder from settings, reading the API key from the environment.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = settings.api_key()?;
        let client = create_client(
            settings.base_url.as_deref(),
            &api_key,
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::with_client(
            client,
            &settings.model,
            settings.dimensions as usize,
        ))
    }

    /// Only the `text-embedding-3` family accepts a requested output size.
    fn supports_dimensions_param(&self) -> bool {
        self.model.starts_with("text-embedding-3")
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut args = CreateEmbeddingRequestArgs::default();
        args.model(&self.model)
            .input(EmbeddingInput::String(text.to_string()));
        if self.supports_dimensions_param() {
            args.dimensions(self.dimensions as u32);
        }
        let request = args
            .build()
            .map_err(|e| BuddyError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| BuddyError::Embedding(format!("Embedding API error: {}", e)))?;

        let embedding = response
            .data
            .into_iter()
            .min_by_key(|e| e.index)
            .map(|e| e.embedding)
            .ok_or_else(|| BuddyError::Embedding("Empty embedding response".to_string()))?;

        if embedding.len() != self.dimensions {
            return Err(BuddyError::Embedding(format!(
                "Expected {} dimensions, model returned {}",
                self.dimensions,
                embedding.len()
            )));
        }

        debug!("Generated {}-dimensional embedding", embedding.len());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
