//! In-process stand-ins for the model, embedding and document services.

use crate::catalog::Catalog;
use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::fetch::DocumentFetcher;
use async_trait::async_trait;
use ltipp_core::{AppError, AppResult};
use ltipp_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const REFERENCE_URL: &str = "https://reference.example/ltipp-efficacy";

/// `{"Aark": ["https://a"], "Lido": ["https://l"]}`, keys in that order.
pub fn catalog() -> Catalog {
    let mut map = BTreeMap::new();
    map.insert("Aark".to_string(), vec!["https://a".to_string()]);
    map.insert("Lido".to_string(), vec!["https://l".to_string()]);
    Catalog::from_parts(map, &["Aark".to_string(), "Lido".to_string()]).unwrap()
}

/// Language model scripted per model name and, optionally, prompt content.
#[derive(Default)]
pub struct ScriptedLlm {
    rules: Vec<Rule>,
    requests: Mutex<Vec<LlmRequest>>,
}

struct Rule {
    model: String,
    needle: Option<String>,
    // None fails the call like an unreachable server
    content: Option<String>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, model: &str, content: &str) -> Self {
        self.rule(model, None, Some(content))
    }

    /// Reply with `content` only when the prompt contains `needle`.
    pub fn reply_if(self, model: &str, needle: &str, content: &str) -> Self {
        self.rule(model, Some(needle), Some(content))
    }

    pub fn fail(self, model: &str) -> Self {
        self.rule(model, None, None)
    }

    fn rule(mut self, model: &str, needle: Option<&str>, content: Option<&str>) -> Self {
        self.rules.push(Rule {
            model: model.to_string(),
            needle: needle.map(str::to_string),
            content: content.map(str::to_string),
        });
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let rule = self.rules.iter().find(|rule| {
            rule.model == request.model
                && rule
                    .needle
                    .as_deref()
                    .map_or(true, |needle| request.prompt.contains(needle))
        });

        match rule {
            Some(Rule {
                content: Some(content),
                ..
            }) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(0, 0),
            }),
            Some(_) => Err(AppError::Llm(format!(
                "Failed to connect to Ollama for model '{}'",
                request.model
            ))),
            None => Err(AppError::Llm(format!(
                "No scripted reply for model '{}'",
                request.model
            ))),
        }
    }
}

/// Fetcher serving documents from memory; unknown URLs fail.
#[derive(Default)]
pub struct MapFetcher {
    documents: HashMap<String, String>,
    delays_ms: HashMap<String, u64>,
    fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, url: &str, text: &str) -> Self {
        self.documents.insert(url.to_string(), text.to_string());
        self
    }

    /// Delay the response for `url`, to shuffle completion order.
    pub fn delayed(mut self, url: &str, ms: u64) -> Self {
        self.delays_ms.insert(url.to_string(), ms);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Most fetches that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(ms) = self.delays_ms.get(url) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Fetch(format!("{} returned 404 Not Found", url)))
    }
}

/// Trigram embedder that counts embedded texts.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: TrigramProvider,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: TrigramProvider::new(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}
