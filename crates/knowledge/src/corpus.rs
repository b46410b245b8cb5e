//! Corpus building: fetch resolved URLs and chunk their text.

use crate::chunker::Chunker;
use crate::fetch::DocumentFetcher;
use crate::types::DocumentChunk;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Fetches documents with bounded concurrency and chunks them in URL order.
pub struct CorpusBuilder {
    fetcher: Arc<dyn DocumentFetcher>,
    chunker: Chunker,
    concurrency: usize,
}

impl CorpusBuilder {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, chunker: Chunker, concurrency: usize) -> Self {
        Self {
            fetcher,
            chunker,
            concurrency: concurrency.max(1),
        }
    }

    /// Chunks of every URL that could be fetched, in URL order.
    ///
    /// Failed URLs are logged and skipped; if every fetch fails the result is empty.
    pub async fn build(&self, urls: &[String]) -> Vec<DocumentChunk> {
        let documents: Vec<(String, Option<String>)> = stream::iter(urls.iter().cloned())
            .map(|url| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    match fetcher.fetch(&url).await {
                        Ok(text) => (url, Some(text)),
                        Err(e) => {
                            tracing::warn!(url = %url, error = %e, "Skipping document that failed to fetch");
                            (url, None)
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let fetched = documents.iter().filter(|(_, text)| text.is_some()).count();

        let chunks: Vec<DocumentChunk> = documents
            .into_iter()
            .filter_map(|(url, text)| text.map(|text| self.chunker.chunk(&url, &text)))
            .flatten()
            .collect();

        tracing::info!(
            urls = urls.len(),
            fetched,
            chunks = chunks.len(),
            "Built corpus"
        );

        chunks
    }
}
