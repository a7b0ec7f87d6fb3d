//! Pinecone data-plane client.

use super::{Match, VectorIndex};
use crate::config::IndexSettings;
use crate::error::{BuddyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Query client for one Pinecone index.
pub struct PineconeIndex {
    client: Client,
    name: String,
    host: String,
    api_key: String,
    namespace: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

impl PineconeIndex {
    /// Create a client for the index served at `host`.
    pub fn new(name: &str, host: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BuddyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            name: name.to_string(),
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            namespace: None,
        })
    }

    /// Query a namespace other than the default one.
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|n| !n.is_empty());
        self
    }

    /// Build from index settings, reading the API key from the environment.
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        let host = settings.host.as_deref().ok_or_else(|| {
            BuddyError::Config(format!("Index {} has no host configured", settings.index_name))
        })?;
        let api_key = settings.api_key()?;

        Ok(Self::new(
            &settings.index_name,
            host,
            &api_key,
            Duration::from_secs(settings.timeout_secs),
        )?
        .with_namespace(settings.namespace.clone()))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vector), fields(index = %self.name, dims = vector.len()))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        let url = format!("{}/query", self.host);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BuddyError::VectorSearch(format!("Query to {} failed: {}", self.name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BuddyError::VectorSearch(format!(
                "Query to {} failed: HTTP {} - {}",
                self.name, status, body
            )));
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            BuddyError::VectorSearch(format!("Malformed response from {}: {}", self.name, e))
        })?;

        debug!("Index returned {} matches", parsed.matches.len());
        Ok(parsed.matches)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_for(server: &MockServer) -> PineconeIndex {
        PineconeIndex::new("learning-buddy-faq", &server.uri(), "pc-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_query_sends_pinecone_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Api-Key", "pc-key"))
            .and(body_partial_json(json!({ "topK": 3, "includeMetadata": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    { "id": "faq-7", "score": 0.85, "metadata": { "question": "Refunds?", "answer": "Within 30 days." } },
                    { "id": "faq-2", "score": 0.41 }
                ],
                "namespace": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let matches = index_for(&server).query(&[0.1, 0.2], 3).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "faq-7");
        assert_eq!(matches[0].metadata_str("answer", "No answer"), "Within 30 days.");
        assert!(matches[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_namespace_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({ "namespace": "interns" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let index = index_for(&server).with_namespace(Some("interns".to_string()));
        let matches = index.query(&[0.1], 2).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_is_vector_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = index_for(&server).query(&[0.1], 2).await.unwrap_err();
        assert!(matches!(err, BuddyError::VectorSearch(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_vector_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = index_for(&server).query(&[0.1], 2).await.unwrap_err();
        assert!(matches!(err, BuddyError::VectorSearch(_)));
    }
}
