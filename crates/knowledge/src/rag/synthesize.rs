//! Final answer synthesis from retrieved context.

use crate::types::ScoredChunk;
use ltipp_core::{AppError, AppResult};
use ltipp_llm::{LlmClient, LlmRequest};
use ltipp_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Separator placed between retrieved chunk texts.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Join retrieved chunk texts, best match first.
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Writes the answer with the answer model.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
        }
    }

    /// One model call; the reply text is the answer.
    ///
    /// An empty `context` is allowed and still produces a call.
    ///
    /// # Errors
    /// Transport failures and blank replies are `AppError::Llm`.
    pub async fn synthesize(&self, question: &str, context: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), context.to_string());
        variables.insert("question".to_string(), question.to_string());

        let built = build_prompt(&self.prompt, &variables)?;
        tracing::debug!(
            model = %self.model,
            prompt_chars = built.text.chars().count(),
            "Synthesizing answer"
        );

        let response = self
            .llm
            .complete(&LlmRequest::new(built.text, &self.model))
            .await?;

        if response.content.trim().is_empty() {
            return Err(AppError::Llm(format!(
                "Model '{}' returned an empty answer",
                self.model
            )));
        }

        Ok(response.content)
    }
}
