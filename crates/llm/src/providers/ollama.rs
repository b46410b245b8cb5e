//! Ollama LLM provider implementation.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use ltipp_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// `/api/generate` body; the whole reply arrives as one JSON object.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl From<GenerateResponse> for LlmResponse {
    fn from(response: GenerateResponse) -> Self {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        Self {
            content: response.response,
            model: response.model,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending completion request to Ollama"
        );

        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Llm(format!("Ollama request timed out: {}", e))
                } else {
                    AppError::Llm(format!("Failed to send request to Ollama: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Model '{}' failed with {}: {}",
                request.model, status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            model = %generated.model,
            eval_count = generated.eval_count.unwrap_or(0),
            "Received completion from Ollama"
        );

        Ok(generated.into())
    }
}
