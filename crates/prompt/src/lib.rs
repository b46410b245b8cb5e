//! Prompt system for the LTIPP assistant.
//!
//! This crate provides:
//! - YAML-based prompt definitions, with built-in defaults compiled in
//! - Per-workspace overrides from `.ltipp/prompts/<id>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, PromptSet};
pub use types::{BuiltPrompt, PromptDefinition, PromptOutputSpec};

/// Prompt that extracts catalog keys from a question.
pub const KEY_EXTRACTION_PROMPT_ID: &str = "keys.extract";

/// Prompt that writes the final answer from retrieved context.
pub const ANSWER_PROMPT_ID: &str = "answer.synthesize";
