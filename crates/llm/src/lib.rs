//! Language model integration for the LTIPP assistant.
//!
//! The answering pipeline talks to a language model twice per question: once
//! to pick catalog keys out of the question and once to write the answer. Both
//! calls go through the [`LlmClient`] trait so tests can script replies.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (`/api/generate`, non-streaming)
//!
//! # Example
//! ```no_run
//! use ltipp_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(60))?;
//! let request = LlmRequest::new("Hello, world!", "llama3");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
