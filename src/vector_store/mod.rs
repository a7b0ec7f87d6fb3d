//! Vector search over the course catalog and FAQ collections.
//!
//! Provides a trait-based interface for different vector index backends.
//! Index contents are managed elsewhere; this crate only queries them.

mod memory;
mod pinecone;

pub use memory::{IndexRecord, MemoryIndex};
pub use pinecone::PineconeIndex;

use crate::config::{IndexProvider, VectorStoreSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Metadata attached to a stored vector. Schema is collection-specific.
pub type Metadata = Map<String, Value>;

/// Logical collections the pipelines search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Course catalog: `course_name`, `category`, `text`.
    Courses,
    /// FAQ pairs: `question`, `answer`.
    Faq,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Courses => write!(f, "courses"),
            Collection::Faq => write!(f, "faq"),
        }
    }
}

/// A nearest-neighbor result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Similarity score (higher is better).
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Match {
    /// Read a string metadata field, substituting `default` when the key is
    /// absent or not a string.
    pub fn metadata_str(&self, key: &str, default: &str) -> String {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }
}

/// One queryable index handle.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` matches in descending score order.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>>;

    /// Index name, for logging.
    fn name(&self) -> &str;
}

/// Searches a named collection.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(&self, vector: &[f32], collection: Collection, top_k: usize) -> Result<Vec<Match>>;
}

/// Routes collection searches to the per-collection index handles.
pub struct CollectionIndexes {
    courses: Arc<dyn VectorIndex>,
    faq: Arc<dyn VectorIndex>,
}

impl CollectionIndexes {
    pub fn new(courses: Arc<dyn VectorIndex>, faq: Arc<dyn VectorIndex>) -> Self {
        Self { courses, faq }
    }

    /// Build both index handles from settings.
    pub fn from_settings(settings: &VectorStoreSettings) -> Result<Self> {
        let (courses, faq): (Arc<dyn VectorIndex>, Arc<dyn VectorIndex>) = match settings.provider {
            IndexProvider::Pinecone => (
                Arc::new(PineconeIndex::from_settings(&settings.courses)?),
                Arc::new(PineconeIndex::from_settings(&settings.faq)?),
            ),
            IndexProvider::Memory => (
                Arc::new(MemoryIndex::from_settings(&settings.courses)?),
                Arc::new(MemoryIndex::from_settings(&settings.faq)?),
            ),
        };
        Ok(Self::new(courses, faq))
    }

    fn index(&self, collection: Collection) -> &Arc<dyn VectorIndex> {
        match collection {
            Collection::Courses => &self.courses,
            Collection::Faq => &self.faq,
        }
    }
}

#[async_trait]
impl VectorSearch for CollectionIndexes {
    async fn search(&self, vector: &[f32], collection: Collection, top_k: usize) -> Result<Vec<Match>> {
        let index = self.index(collection);
        tracing::debug!(collection = %collection, index = index.name(), top_k, "Querying index");
        index.query(vector, top_k).await
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
