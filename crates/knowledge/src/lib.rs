//! Question answering over the LTIPP grant-project catalog.
//!
//! A question is mapped to catalog entities by a language model, the
//! entities' source documents are fetched and chunked, the chunks are
//! embedded into a per-request index, and the best-matching chunks are
//! handed to a second model that writes the answer.

pub mod catalog;
pub mod chunker;
pub mod corpus;
pub mod embeddings;
pub mod extract;
pub mod fetch;
pub mod fuzzy;
pub mod index;
pub mod rag;
pub mod report;
pub mod resolve;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use catalog::Catalog;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use extract::{parse_keys_reply, KeyExtractor, ParsedKeys};
pub use fetch::{DocumentFetcher, HttpFetcher};
pub use index::EphemeralIndex;
pub use rag::{AnswerPipeline, PipelineSettings};
pub use report::ReportCache;
pub use resolve::{KeyResolver, Resolution, ResolvedUrls};
pub use types::{DocumentChunk, RagAnswer, ScoredChunk};
