//! Request-scoped vector index over the chunks of one question.
//!
//! An [`EphemeralIndex`] is created per question, rebuilt once with that
//! question's chunks, queried, and dropped. Nothing is shared between requests.

use crate::embeddings::EmbeddingProvider;
use crate::types::{DocumentChunk, ScoredChunk};
use crate::vector_index::{InMemoryVectorIndex, VectorIndex};
use ltipp_core::{AppError, AppResult};
use std::sync::Arc;

/// Per-request index pairing a vector store with the embedder that fills it.
#[derive(Debug)]
pub struct EphemeralIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    store: InMemoryVectorIndex,
    built: bool,
}

impl EphemeralIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            store: InMemoryVectorIndex::new(),
            built: false,
        }
    }

    /// Replace the index contents with `chunks`.
    ///
    /// Prior entries are removed before anything is embedded, so a failed
    /// rebuild leaves the index empty rather than stale.
    ///
    /// # Errors
    /// Propagates embedding failures.
    pub async fn rebuild(&mut self, chunks: Vec<DocumentChunk>) -> AppResult<()> {
        self.store.reset();
        self.built = true;

        if chunks.is_empty() {
            tracing::debug!("Rebuilt empty index");
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            self.store.reset();
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if let Err(e) = self.store.insert(chunk, embedding) {
                self.store.reset();
                return Err(e);
            }
        }

        tracing::info!(
            chunks = self.store.len(),
            provider = self.embedder.provider_name(),
            "Indexed chunks"
        );

        Ok(())
    }

    /// Top-`k` chunks most similar to `question`.
    ///
    /// An empty index returns no chunks without embedding the question.
    ///
    /// # Errors
    /// Returns `AppError::Index` if called before [`rebuild`](Self::rebuild),
    /// and propagates embedding failures.
    pub async fn retrieve(&self, question: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        if !self.built {
            return Err(AppError::Index(
                "retrieve called before rebuild".to_string(),
            ));
        }

        if self.store.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(question).await?;
        let results = self.store.search(&query, k)?;

        tracing::info!(
            retrieved = results.len(),
            top_score = results.first().map(|r| r.score).unwrap_or(0.0),
            "Retrieved chunks"
        );

        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
