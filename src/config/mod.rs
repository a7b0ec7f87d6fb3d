//! Configuration module for Learning Buddy.
//!
//! Handles loading and validating application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationProvider, GenerationSettings, IndexProvider,
    IndexSettings, PipelineSettings, PromptSettings, RetrievalSettings, ServerSettings, Settings,
    VectorStoreSettings,
};
