//! Offline embedding provider hashing character trigrams and words.

use crate::embeddings::provider::EmbeddingProvider;
use ltipp_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "how", "much", "did", "what", "does",
];

/// Deterministic, content-dependent embeddings without a model.
///
/// Texts sharing words or word fragments get similar vectors. Not semantic,
/// but stable across runs, which makes it suitable for development and tests.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let hash = trigram
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash % self.dimensions as u64) as usize] += (*freq as f32).sqrt();
            }

            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(hash % self.dimensions as u64) as usize] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|v| *v /= norm);
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
