//! Configuration settings for Learning Buddy.

use crate::error::{BuddyError, Result};
use crate::openai::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log output format for the server (text, json).
    pub log_format: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allow any origin, method and header.
    pub enable_cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model name.
    pub model: String,
    /// Vector dimensionality; must match both indexes.
    pub dimensions: u32,
    /// Base URL of an OpenAI-compatible embeddings API. None uses api.openai.com.
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            base_url: Some("http://localhost:8080/v1".to_string()),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingSettings {
    /// Resolve the API key. Self-hosted endpoints may run without one.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ if self.base_url.is_some() => Ok(String::new()),
            _ => Err(BuddyError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                self.api_key_env, self.api_key_env
            ))),
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    /// Hosted Pinecone indexes (default).
    #[default]
    Pinecone,
    /// In-process index loaded from JSON seed files.
    Memory,
}

impl std::str::FromStr for IndexProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinecone" => Ok(IndexProvider::Pinecone),
            "memory" => Ok(IndexProvider::Memory),
            _ => Err(format!("Unknown vector store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for IndexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexProvider::Pinecone => write!(f, "pinecone"),
            IndexProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Settings for one collection's index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub index_name: String,
    /// Pinecone data-plane host, e.g. `https://learning-buddy-abc123.svc.pinecone.io`.
    pub host: Option<String>,
    /// Environment variable holding this index's API key.
    pub api_key_env: String,
    pub namespace: Option<String>,
    /// JSON seed file for the memory provider.
    pub seed_path: Option<String>,
    pub timeout_secs: u64,
}

impl IndexSettings {
    fn named(index_name: &str, api_key_env: &str) -> Self {
        Self {
            index_name: index_name.to_string(),
            host: None,
            api_key_env: api_key_env.to_string(),
            namespace: None,
            seed_path: None,
            timeout_secs: 30,
        }
    }

    /// Resolve the index API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        require_env(&self.api_key_env)
    }
}

impl Default for IndexSettings {
    /// Blank names are filled per collection after loading.
    fn default() -> Self {
        Self::named("", "")
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub provider: IndexProvider,
    pub courses: IndexSettings,
    pub faq: IndexSettings,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: IndexProvider::Pinecone,
            courses: IndexSettings::named("learning-buddy", "COURSE_API_KEY"),
            faq: IndexSettings::named("learning-buddy-faq", "FAQ_API_KEY"),
        }
    }
}

impl VectorStoreSettings {
    /// Fill collection-specific names that a partial config section left blank.
    fn apply_collection_defaults(&mut self) {
        let defaults = Self::default();
        for (index, fallback) in [
            (&mut self.courses, &defaults.courses),
            (&mut self.faq, &defaults.faq),
        ] {
            if index.index_name.is_empty() {
                index.index_name = fallback.index_name.clone();
            }
            if index.api_key_env.is_empty() {
                index.api_key_env = fallback.api_key_env.clone();
            }
        }
    }
}

/// Completion service provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Azure OpenAI deployment (default).
    #[default]
    Azure,
    /// OpenAI or any compatible API.
    OpenAI,
}

impl std::str::FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(GenerationProvider::Azure),
            "openai" => Ok(GenerationProvider::OpenAI),
            _ => Err(format!("Unknown generation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProvider::Azure => write!(f, "azure"),
            GenerationProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Completion service settings and decoding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: GenerationProvider,
    /// Model name, or the deployment name for Azure.
    pub model: String,
    /// Environment variable holding the endpoint (Azure) or API base (OpenAI).
    pub endpoint_env: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Azure API version.
    pub api_version: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Azure,
            model: "gpt-4o-mini".to_string(),
            endpoint_env: "AZURE_OPENAI_ENDPOINT".to_string(),
            api_key_env: "AZURE_OPENAI_KEY".to_string(),
            api_version: "2024-06-01".to_string(),
            temperature: 0.9,
            top_p: 1.0,
            max_tokens: 100,
            presence_penalty: 1.5,
            frequency_penalty: 1.5,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GenerationSettings {
    /// Resolve the API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        require_env(&self.api_key_env)
    }

    /// Resolve the endpoint. Required for Azure, optional for OpenAI.
    pub fn endpoint(&self) -> Result<Option<String>> {
        match (self.provider, std::env::var(&self.endpoint_env)) {
            (_, Ok(value)) if !value.is_empty() => Ok(Some(value)),
            (GenerationProvider::OpenAI, _) => Ok(None),
            (GenerationProvider::Azure, _) => require_env(&self.endpoint_env).map(Some),
        }
    }
}

/// Retrieval sizes and the evidence relevance threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Courses returned per interest area.
    pub course_top_k: usize,
    /// FAQ matches returned by the plain lookup.
    pub faq_top_k: usize,
    /// FAQ matches considered as evidence for a generated answer.
    pub rag_top_k: usize,
    /// Evidence must score strictly above this.
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            course_top_k: 2,
            faq_top_k: 2,
            rag_top_k: 3,
            min_score: 0.7,
        }
    }
}

/// Per-request pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineSettings {
    /// Deadline for a whole request across all external calls. None disables it.
    pub request_timeout_secs: Option<u64>,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Name the assistant answers on behalf of.
    pub platform_name: String,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            custom_dir: None,
            platform_name: "Learning Buddy".to_string(),
            variables: std::collections::HashMap::new(),
        }
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(BuddyError::Config(format!("{} is empty", name))),
        Err(_) => Err(BuddyError::Config(format!(
            "{} not set. Set it with: export {}='...' or add it to .env",
            name, name
        ))),
    }
}

fn check_url(label: &str, value: &str) -> Result<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| BuddyError::Config(format!("{} is not a valid URL ({}): {}", label, value, e)))
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let mut settings: Settings = toml::from_str(&content)?;
            settings.vector_store.apply_collection_defaults();
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("learning-buddy")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Check that every startup credential and endpoint is present.
    ///
    /// Returns the first problem found; the process must not serve traffic
    /// when this fails.
    pub fn validate(&self) -> Result<()> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Every configuration problem, for diagnostics.
    pub fn problems(&self) -> Vec<BuddyError> {
        let mut problems = Vec::new();

        if self.embedding.dimensions == 0 {
            problems.push(BuddyError::Config("embedding.dimensions must be positive".to_string()));
        }
        if let Some(base) = &self.embedding.base_url {
            if let Err(e) = check_url("embedding.base_url", base) {
                problems.push(e);
            }
        }
        if let Err(e) = self.embedding.api_key() {
            problems.push(e);
        }

        for (label, index) in [("courses", &self.vector_store.courses), ("faq", &self.vector_store.faq)] {
            match self.vector_store.provider {
                IndexProvider::Pinecone => {
                    match &index.host {
                        Some(host) => {
                            if let Err(e) = check_url(&format!("vector_store.{}.host", label), host) {
                                problems.push(e);
                            }
                        }
                        None => problems.push(BuddyError::Config(format!(
                            "vector_store.{}.host is required for the pinecone provider",
                            label
                        ))),
                    }
                    if let Err(e) = index.api_key() {
                        problems.push(e);
                    }
                }
                IndexProvider::Memory => {
                    if index.seed_path.is_none() {
                        problems.push(BuddyError::Config(format!(
                            "vector_store.{}.seed_path is required for the memory provider",
                            label
                        )));
                    }
                }
            }
        }

        match self.generation.endpoint() {
            Ok(Some(endpoint)) => {
                if let Err(e) = check_url(&self.generation.endpoint_env, &endpoint) {
                    problems.push(e);
                }
            }
            Ok(None) => {}
            Err(e) => problems.push(e),
        }
        if let Err(e) = self.generation.api_key() {
            problems.push(e);
        }

        let retrieval = &self.retrieval;
        if retrieval.course_top_k == 0 || retrieval.faq_top_k == 0 || retrieval.rag_top_k == 0 {
            problems.push(BuddyError::Config("retrieval top_k values must be positive".to_string()));
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reference_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.min_score, 0.7);
        assert_eq!(settings.retrieval.course_top_k, 2);
        assert_eq!(settings.retrieval.rag_top_k, 3);
        assert_eq!(settings.generation.temperature, 0.9);
        assert_eq!(settings.generation.max_tokens, 100);
        assert_eq!(settings.generation.presence_penalty, 1.5);
        assert_eq!(settings.vector_store.faq.index_name, "learning-buddy-faq");
        assert_eq!(settings.vector_store.faq.api_key_env, "FAQ_API_KEY");
        assert!(settings.pipeline.request_timeout_secs.is_none());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[retrieval]
min_score = 0.8

[vector_store]
provider = "memory"

[vector_store.faq]
seed_path = "~/faq.json"

[pipeline]
request_timeout_secs = 20
"#
        )
        .unwrap();

        let settings = Settings::load_from(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.retrieval.min_score, 0.8);
        assert_eq!(settings.retrieval.faq_top_k, 2);
        assert_eq!(settings.vector_store.provider, IndexProvider::Memory);
        assert_eq!(settings.vector_store.faq.seed_path.as_deref(), Some("~/faq.json"));
        assert_eq!(settings.vector_store.faq.index_name, "learning-buddy-faq");
        assert_eq!(settings.vector_store.faq.api_key_env, "FAQ_API_KEY");
        assert_eq!(settings.pipeline.request_timeout_secs, Some(20));
        assert_eq!(settings.prompts.platform_name, "Learning Buddy");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        let mut settings = Settings::default();
        settings.vector_store.courses.api_key_env = "LB_TEST_UNSET_COURSE_KEY".to_string();
        settings.vector_store.faq.api_key_env = "LB_TEST_UNSET_FAQ_KEY".to_string();
        settings.generation.endpoint_env = "LB_TEST_UNSET_ENDPOINT".to_string();
        settings.generation.api_key_env = "LB_TEST_UNSET_AZURE_KEY".to_string();

        let err = settings.validate().unwrap_err();
        assert!(matches!(err, BuddyError::Config(_)));

        let messages: Vec<String> = settings.problems().iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("vector_store.courses.host")));
        assert!(messages.iter().any(|m| m.contains("LB_TEST_UNSET_FAQ_KEY")));
        assert!(messages.iter().any(|m| m.contains("LB_TEST_UNSET_ENDPOINT")));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Memory".parse::<IndexProvider>().unwrap(), IndexProvider::Memory);
        assert_eq!("openai".parse::<GenerationProvider>().unwrap(), GenerationProvider::OpenAI);
        assert!("qdrant".parse::<IndexProvider>().is_err());
    }
}
