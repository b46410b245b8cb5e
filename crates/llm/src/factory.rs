//! LLM provider factory.
//!
//! Builds the completion client described by the `llm` configuration section.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use ltipp_core::config::LlmSettings;
use ltipp_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for the configured endpoint.
///
/// Only Ollama is supported; the endpoint must be an http(s) URL.
///
/// # Errors
/// Returns `AppError::Config` for a malformed endpoint and `AppError::Llm` if
/// the HTTP client cannot be built.
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = settings.endpoint.trim();

    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "LLM endpoint must be an http(s) URL, got '{}'",
            settings.endpoint
        )));
    }

    let timeout = Duration::from_secs(settings.timeout_secs.max(1));
    let client = OllamaClient::new(endpoint, timeout)?;

    tracing::debug!(endpoint, timeout_secs = timeout.as_secs(), "Created Ollama client");

    Ok(Arc::new(client))
}
