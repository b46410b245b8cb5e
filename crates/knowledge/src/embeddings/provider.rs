//! Embedding provider trait and factory.

use super::providers::{OllamaProvider, TrigramProvider};
use ltipp_core::config::EmbeddingSettings;
use ltipp_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one vector per text in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create the embedding provider described by `settings`.
///
/// `endpoint` is the Ollama base URL shared with the language model client.
pub fn create_provider(
    settings: &EmbeddingSettings,
    endpoint: &str,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be positive".to_string(),
        ));
    }

    match settings.provider.as_str() {
        "ollama" => {
            let timeout = Duration::from_secs(settings.timeout_secs.max(1));
            let provider =
                OllamaProvider::new(endpoint, &settings.model, settings.dimensions, timeout)?;
            Ok(Arc::new(provider))
        }

        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimensions))),

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            other
        ))),
    }
}
