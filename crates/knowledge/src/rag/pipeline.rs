//! The per-question answering pipeline.
//!
//! question -> candidate keys -> resolved URLs -> chunks -> per-request index
//! -> top-k context -> answer.

use crate::catalog::Catalog;
use crate::chunker::Chunker;
use crate::corpus::CorpusBuilder;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::extract::KeyExtractor;
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::index::EphemeralIndex;
use crate::rag::synthesize::{build_context, AnswerSynthesizer};
use crate::resolve::{KeyResolver, ResolvedUrls};
use crate::types::{RagAnswer, ScoredChunk};
use ltipp_core::{AppConfig, AppError, AppResult};
use ltipp_llm::LlmClient;
use ltipp_prompt::PromptSet;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Pipeline knobs taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub extraction_model: String,
    pub answer_model: String,
    pub reference_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub fuzzy_floor: u8,
    pub fetch_concurrency: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            extraction_model: config.llm.extraction_model.clone(),
            answer_model: config.llm.answer_model.clone(),
            reference_url: config.catalog.reference_url.clone(),
            chunk_size: config.retrieval.chunk_size,
            chunk_overlap: config.retrieval.chunk_overlap,
            top_k: config.retrieval.top_k,
            fuzzy_floor: config.retrieval.fuzzy_floor,
            fetch_concurrency: config.retrieval.fetch_concurrency,
        }
    }
}

/// Answers questions about catalog entities.
///
/// Shared read-only across requests; each [`answer`](Self::answer) call builds
/// and drops its own [`EphemeralIndex`].
pub struct AnswerPipeline {
    catalog: Arc<Catalog>,
    extractor: KeyExtractor,
    resolver: KeyResolver,
    corpus: CorpusBuilder,
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl AnswerPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        catalog: Arc<Catalog>,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        fetcher: Arc<dyn DocumentFetcher>,
        prompts: PromptSet,
        settings: &PipelineSettings,
    ) -> AppResult<Self> {
        let chunker = Chunker::new(settings.chunk_size, settings.chunk_overlap)?;

        Ok(Self {
            catalog,
            extractor: KeyExtractor::new(
                Arc::clone(&llm),
                &settings.extraction_model,
                prompts.key_extraction,
            ),
            resolver: KeyResolver::new(&settings.reference_url, settings.fuzzy_floor),
            corpus: CorpusBuilder::new(fetcher, chunker, settings.fetch_concurrency),
            embedder,
            synthesizer: AnswerSynthesizer::new(llm, &settings.answer_model, prompts.answer),
            top_k: settings.top_k,
        })
    }

    /// Build the production pipeline: catalog files, Ollama clients, HTTP fetcher
    /// and workspace prompts.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let map_path = config.catalog_map_path();
        let keys_path = config.catalog_keys_path();
        let catalog = Catalog::load(&map_path, Some(keys_path.as_path()))?;

        if catalog.is_empty() {
            tracing::warn!("Entity catalog is empty; only the reference document will be used");
        }

        let llm = ltipp_llm::create_client(&config.llm)?;
        let embedder = create_provider(&config.embedding, &config.llm.endpoint)?;
        let fetcher = HttpFetcher::new(Duration::from_secs(
            config.retrieval.fetch_timeout_secs.max(1),
        ))?;
        let prompts = PromptSet::load(&config.prompts_dir())?;

        tracing::debug!(
            extraction_model = %config.llm.extraction_model,
            answer_model = %config.llm.answer_model,
            embedder = embedder.provider_name(),
            "Answer pipeline ready"
        );

        Self::new(
            Arc::new(catalog),
            llm,
            embedder,
            Arc::new(fetcher),
            prompts,
            &PipelineSettings::from_config(config),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Extract candidate keys from `question` and resolve them to URLs.
    ///
    /// # Errors
    /// Returns `AppError::InvalidInput` for a blank question and propagates
    /// extraction model failures.
    pub async fn resolve(&self, question: &str) -> AppResult<ResolvedUrls> {
        let question = non_blank(question)?;

        let candidates = self.extractor.extract(question, &self.catalog).await?;
        let resolved = self.resolver.resolve(&candidates, &self.catalog);

        tracing::info!(
            candidates = candidates.len(),
            urls = resolved.urls.len(),
            "Resolved candidate keys"
        );

        Ok(resolved)
    }

    /// Answer `question` end to end.
    ///
    /// # Errors
    /// Returns `AppError::InvalidInput` for a blank question; model and
    /// embedding transport failures are fatal for the request. Fetch failures
    /// are not: unreachable documents are skipped.
    pub async fn answer(&self, question: &str) -> AppResult<RagAnswer> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("answer", %request_id);

        async move {
            let question = non_blank(question)?;
            tracing::info!(question, "Answering question");

            let retrieval = self.retrieve(question).await?;
            let context = build_context(&retrieval.retrieved);

            let answer = self.synthesizer.synthesize(question, &context).await?;

            tracing::info!(
                chunks_indexed = retrieval.chunks_indexed,
                retrieved = retrieval.retrieved.len(),
                answer_chars = answer.chars().count(),
                "Answered question"
            );

            Ok(RagAnswer {
                answer,
                sources: distinct_sources(&retrieval.retrieved),
                urls: retrieval.urls,
                chunks_indexed: retrieval.chunks_indexed,
            })
        }
        .instrument(span)
        .await
    }

    /// Retrieved context for `question`, joined as the answer model would see
    /// it, without calling the answer model.
    ///
    /// # Errors
    /// Same as [`answer`](Self::answer), minus synthesis failures.
    pub async fn context(&self, question: &str) -> AppResult<String> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("context", %request_id);

        async move {
            let question = non_blank(question)?;
            let retrieval = self.retrieve(question).await?;
            Ok(build_context(&retrieval.retrieved))
        }
        .instrument(span)
        .await
    }

    /// Shared steps: resolve, build the corpus, index it and retrieve top-k.
    async fn retrieve(&self, question: &str) -> AppResult<Retrieval> {
        let resolved = self.resolve(question).await?;
        let chunks = self.corpus.build(&resolved.urls).await;

        let mut index = EphemeralIndex::new(Arc::clone(&self.embedder));
        index.rebuild(chunks).await?;
        let chunks_indexed = index.len();

        let retrieved = index.retrieve(question, self.top_k).await?;

        Ok(Retrieval {
            urls: resolved.urls,
            chunks_indexed,
            retrieved,
        })
    }
}

struct Retrieval {
    urls: Vec<String>,
    chunks_indexed: usize,
    retrieved: Vec<ScoredChunk>,
}

fn non_blank(question: &str) -> AppResult<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidInput("Question must not be empty".to_string()));
    }
    Ok(question)
}

fn distinct_sources(retrieved: &[ScoredChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    retrieved
        .iter()
        .map(|scored| scored.chunk.source_url.as_str())
        .filter(|url| seen.insert(*url))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentChunk;

    #[test]
    fn test_settings_from_default_config() {
        let settings = PipelineSettings::from_config(&AppConfig::default());

        assert_eq!(settings.extraction_model, "llama3");
        assert_eq!(settings.answer_model, "llama3:70b");
        assert_eq!(settings.chunk_size, 2000);
        assert_eq!(settings.chunk_overlap, 200);
        assert_eq!(settings.top_k, 20);
        assert_eq!(settings.fuzzy_floor, 0);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  How did Lido do? ").unwrap(), "How did Lido do?");
        assert!(matches!(non_blank(" \n\t"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_distinct_sources_keep_rank_order() {
        let scored = |url: &str, score: f32| ScoredChunk {
            chunk: DocumentChunk::new(url, 0, "text"),
            score,
        };

        let sources = distinct_sources(&[
            scored("https://l", 0.9),
            scored("https://ref", 0.8),
            scored("https://l", 0.7),
        ]);

        assert_eq!(sources, vec!["https://l".to_string(), "https://ref".to_string()]);
    }
}
