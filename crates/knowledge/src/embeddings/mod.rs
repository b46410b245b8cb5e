//! Embedding generation for chunks and questions.
//!
//! Providers are chosen by the `embedding` configuration section; the same
//! provider must embed both the chunks of a request and its question.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
