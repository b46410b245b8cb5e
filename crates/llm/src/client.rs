//! LLM client abstraction and request/response types.

use ltipp_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Fully rendered prompt text
    pub prompt: String,

    /// Model identifier (e.g., "llama3", "llama3:70b")
    pub model: String,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// LLM completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Trait for LLM providers.
///
/// A single stateless, single-turn completion. Implementations must not retry:
/// the caller decides what a failed call means for the request.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    ///
    /// Transport failures, timeouts and non-success statuses are returned as
    /// `AppError::Llm`.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_prompt_and_model() {
        let request = LlmRequest::new("Which projects?", "llama3");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["prompt"], "Which projects?");
        assert_eq!(json["model"], "llama3");
    }

    #[test]
    fn test_usage_totals() {
        let usage = LlmUsage::new(120, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = LlmUsage::new(u32::MAX, 10);
        assert_eq!(usage.total_tokens, u32::MAX);
    }
}
