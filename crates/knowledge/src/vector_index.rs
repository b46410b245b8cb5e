//! Vector index abstraction for document chunks.

use crate::types::{DocumentChunk, ScoredChunk};
use ltipp_core::{AppError, AppResult};

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Append a chunk with its embedding.
    fn insert(&mut self, chunk: DocumentChunk, embedding: Vec<f32>) -> AppResult<()>;

    /// Top-k chunks by descending cosine similarity to `query_embedding`.
    ///
    /// Equal scores keep insertion order.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Number of stored chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    fn reset(&mut self);
}

/// Brute-force in-memory index; every search scans all entries.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    dimensions: Option<usize>,
    entries: Vec<(DocumentChunk, Vec<f32>)>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for InMemoryVectorIndex {
    fn insert(&mut self, chunk: DocumentChunk, embedding: Vec<f32>) -> AppResult<()> {
        match self.dimensions {
            Some(dimensions) if dimensions != embedding.len() => {
                return Err(AppError::Index(format!(
                    "Embedding has {} dimensions, index holds {}",
                    embedding.len(),
                    dimensions
                )));
            }
            Some(_) => {}
            None => self.dimensions = Some(embedding.len()),
        }

        self.entries.push((chunk, embedding));
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        if let Some(dimensions) = self.dimensions {
            if dimensions != query_embedding.len() {
                return Err(AppError::Index(format!(
                    "Query embedding has {} dimensions, index holds {}",
                    query_embedding.len(),
                    dimensions
                )));
            }
        }

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        // Stable sort: ties stay in insertion order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.dimensions = None;
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 if either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
