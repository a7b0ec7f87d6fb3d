//! In-memory vector index.
//!
//! Loaded once from a JSON seed file and never mutated. Useful for local
//! development and tests.

use super::{cosine_similarity, Match, Metadata, VectorIndex};
use crate::config::{IndexSettings, Settings};
use crate::error::{BuddyError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A stored vector with its metadata, as it appears in a seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl IndexRecord {
    /// Create a record. Non-object metadata is dropped.
    pub fn new(id: &str, values: Vec<f32>, metadata: Value) -> Self {
        let metadata = match metadata {
            Value::Object(map) => map,
            _ => Metadata::new(),
        };
        Self {
            id: id.to_string(),
            values,
            metadata,
        }
    }
}

/// Read-only in-memory index using cosine similarity.
pub struct MemoryIndex {
    name: String,
    records: Vec<IndexRecord>,
}

impl MemoryIndex {
    /// Create an index over the given records.
    pub fn new(name: &str, records: Vec<IndexRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }

    /// Load records from a JSON array file.
    pub fn from_json_file(name: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<IndexRecord> = serde_json::from_str(&content)?;

        if let Some(first) = records.first() {
            let dims = first.values.len();
            if let Some(bad) = records.iter().find(|r| r.values.len() != dims) {
                return Err(BuddyError::Config(format!(
                    "Seed file {} mixes dimensions: record {} has {}, expected {}",
                    path.display(),
                    bad.id,
                    bad.values.len(),
                    dims
                )));
            }
        }

        tracing::info!(index = name, records = records.len(), "Loaded in-memory index");
        Ok(Self::new(name, records))
    }

    /// Build from index settings; `seed_path` is required.
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        let seed = settings.seed_path.as_deref().ok_or_else(|| {
            BuddyError::Config(format!(
                "Index {} has no seed_path for the memory provider",
                settings.index_name
            ))
        })?;
        Self::from_json_file(&settings.index_name, &Settings::expand_path(seed))
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        let mut results: Vec<Match> = self
            .records
            .iter()
            .map(|record| Match {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
