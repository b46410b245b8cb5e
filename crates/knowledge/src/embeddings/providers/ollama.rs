//! Ollama embedding provider.
//!
//! Calls `POST /api/embeddings` once per text (the endpoint has no batch form)
//! with a bounded number of requests in flight. Transient failures are retried
//! with exponential backoff; a request that still fails after the last retry
//! fails the whole batch.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use ltipp_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum attempts per text
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Embedding requests in flight per batch
const BATCH_CONCURRENCY: usize = 4;

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider. No request is made until the first embedding.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_RETRIES, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Embedding(format!("Ollama embedding request timed out: {}", e))
                } else {
                    AppError::Embedding(format!("Failed to send request to Ollama: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "ollama", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Embedding("Cannot embed empty text".to_string()));
        }

        self.embed_with_retries(text).await
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());

        let dimensions = self.dimensions;

        // `buffered` keeps results in input order
        stream::iter(texts.iter().cloned().enumerate())
            .map(|(i, text)| async move {
                if text.trim().is_empty() {
                    warn!("Embedding zero vector for empty text at index {}", i);
                    Ok(vec![0.0; dimensions])
                } else {
                    self.embed_with_retries(&text).await
                }
            })
            .buffered(BATCH_CONCURRENCY)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OllamaProvider {
        OllamaProvider::new(base_url, "nomic-embed-text", 768, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_provider_metadata() {
        let provider = provider("http://localhost:11434/");
        assert_eq!(provider.base_url, "http://localhost:11434");
        assert_eq!(provider.dimensions(), 768);
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "How much ARB did Lido get?",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["prompt"], "How much ARB did Lido get?");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_request() {
        let provider = provider("http://127.0.0.1:9");
        let result = provider.embed("   ").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let provider = provider("http://127.0.0.1:9");
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_embed_batch_future_is_send() {
        let provider = provider("http://127.0.0.1:9");
        let texts = vec!["Lido".to_string()];
        assert_send(&provider.embed_batch(&texts));
    }

    #[tokio::test]
    async fn test_blank_texts_in_batch_get_zero_vectors() {
        let provider = provider("http://127.0.0.1:9");
        let embeddings = provider
            .embed_batch(&["  ".to_string(), String::new()])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 768 && e.iter().all(|v| *v == 0.0)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_embedding_error() {
        let provider = provider("http://127.0.0.1:9");
        let err = provider.embed("hello").await.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.is_transport());
    }
}
