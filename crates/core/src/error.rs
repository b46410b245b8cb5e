//! Error types for the LTIPP assistant.
//!
//! One enum covers every failure domain of the answering pipeline. Recoverable
//! conditions (malformed model replies, fuzzy misses, single failed fetches) are
//! handled where they occur and never become an `AppError`.

use thiserror::Error;

/// Unified error type for the LTIPP assistant.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model transport or protocol errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding service transport or protocol errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Document fetch errors (per URL, normally recovered by the corpus builder)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Entity catalog loading errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Ephemeral index protocol violations
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Caller supplied unusable input (e.g., an empty question)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error came from a remote collaborator (model, embeddings, source site).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Llm(_) | Self::Embedding(_) | Self::Fetch(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(AppError::Llm("timeout".to_string()).is_transport());
        assert!(AppError::Embedding("refused".to_string()).is_transport());
        assert!(!AppError::Config("bad".to_string()).is_transport());
        assert!(!AppError::Index("empty".to_string()).is_transport());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
