//! Core types for the answering pipeline.

use serde::{Deserialize, Serialize};

/// A contiguous slice of one fetched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    /// URL of the document the chunk came from
    pub source_url: String,

    /// Position of this chunk within its document (0-indexed)
    pub position: u32,

    /// Chunk text
    pub text: String,
}

impl DocumentChunk {
    pub fn new(source_url: impl Into<String>, position: u32, text: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            position,
            text: text.into(),
        }
    }
}

/// A chunk returned by retrieval, with its cosine similarity to the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Result of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagAnswer {
    /// Text produced by the answer model
    pub answer: String,

    /// Resolved URL set the corpus was built from (reference URL last)
    pub urls: Vec<String>,

    /// Number of chunks placed in the per-request index
    pub chunks_indexed: usize,

    /// Source URLs of the retrieved chunks, first-seen order, no duplicates
    pub sources: Vec<String>,
}
