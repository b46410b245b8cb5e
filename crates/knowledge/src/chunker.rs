//! Text chunking with configurable size and overlap.

use crate::types::DocumentChunk;
use ltipp_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits documents into overlapping chunks measured in characters.
///
/// Splits prefer paragraph, sentence and word boundaries and never fall
/// inside a UTF-8 code point.
pub struct Chunker {
    splitter: TextSplitter<Characters>,
}

impl Chunker {
    /// # Errors
    /// Returns `AppError::Config` if `chunk_size` is zero or `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config("Chunk size must be positive".to_string()));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk overlap {}: {}", overlap, e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Chunk one document, numbering chunks from 0 in document order.
    pub fn chunk(&self, source_url: &str, text: &str) -> Vec<DocumentChunk> {
        let chunks: Vec<DocumentChunk> = self
            .splitter
            .chunks(text)
            .filter(|chunk| !chunk.trim().is_empty())
            .enumerate()
            .map(|(position, chunk)| DocumentChunk::new(source_url, position as u32, chunk))
            .collect();

        tracing::debug!(
            source_url,
            chunks = chunks.len(),
            chars = text.chars().count(),
            "Chunked document"
        );

        chunks
    }
}
