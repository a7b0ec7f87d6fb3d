//! Error types for Learning Buddy.

use std::fmt;
use thiserror::Error;

/// Pipeline stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Embed,
    Retrieve,
    Filter,
    Compose,
    Generate,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Embed => "embed",
            Stage::Retrieve => "retrieve",
            Stage::Filter => "filter",
            Stage::Compose => "compose",
            Stage::Generate => "generate",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Coarse failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input, rejected before any external call.
    ClientInput,
    /// Embedding or vector search failed.
    Retrieval,
    /// The completion service failed.
    Generation,
    /// Missing or malformed startup configuration.
    Configuration,
}

/// Library-level error type for Learning Buddy operations.
#[derive(Error, Debug)]
pub enum BuddyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector search failed: {0}")]
    VectorSearch(String),

    #[error("Response generation failed: {0}")]
    Generation(String),

    #[error("Deadline exceeded during {stage} stage")]
    Timeout { stage: Stage },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl BuddyError {
    /// Classify this error for the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuddyError::InvalidInput(_) => ErrorKind::ClientInput,
            BuddyError::Config(_)
            | BuddyError::TomlParse(_)
            | BuddyError::Io(_)
            | BuddyError::Json(_) => ErrorKind::Configuration,
            BuddyError::Generation(_) => ErrorKind::Generation,
            BuddyError::Timeout { stage } => match stage {
                Stage::Generate | Stage::Compose => ErrorKind::Generation,
                _ => ErrorKind::Retrieval,
            },
            BuddyError::Embedding(_) | BuddyError::VectorSearch(_) => ErrorKind::Retrieval,
        }
    }

    /// The pipeline stage this error belongs to, if it is a per-request failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BuddyError::InvalidInput(_) => Some(Stage::Validate),
            BuddyError::Embedding(_) => Some(Stage::Embed),
            BuddyError::VectorSearch(_) => Some(Stage::Retrieve),
            BuddyError::Generation(_) => Some(Stage::Generate),
            BuddyError::Timeout { stage } => Some(*stage),
            BuddyError::Config(_)
            | BuddyError::Io(_)
            | BuddyError::Json(_)
            | BuddyError::TomlParse(_) => None,
        }
    }

    /// Whether this error was caused by the caller rather than a service.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::ClientInput
    }
}

/// Result type alias for Learning Buddy operations.
pub type Result<T> = std::result::Result<T, BuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = BuddyError::InvalidInput("Query cannot be empty".to_string());
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert_eq!(err.stage(), Some(Stage::Validate));
        assert!(err.is_client_error());

        let err = BuddyError::VectorSearch("index unavailable".to_string());
        assert_eq!(err.kind(), ErrorKind::Retrieval);
        assert_eq!(err.stage(), Some(Stage::Retrieve));

        let err = BuddyError::Generation("quota exceeded".to_string());
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(!err.is_client_error());

        let err = BuddyError::Config("FAQ_API_KEY not set".to_string());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_timeout_kind_follows_stage() {
        let embed = BuddyError::Timeout { stage: Stage::Embed };
        assert_eq!(embed.kind(), ErrorKind::Retrieval);

        let generate = BuddyError::Timeout { stage: Stage::Generate };
        assert_eq!(generate.kind(), ErrorKind::Generation);
        assert_eq!(generate.to_string(), "Deadline exceeded during generate stage");
    }
}
