//! Prompt types for the LTIPP assistant.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Variables the template expects; rendering fails if one is missing
    #[serde(default)]
    pub variables: Vec<String>,

    /// Template string with Handlebars syntax
    pub template: String,

    /// Output specification
    pub output: PromptOutputSpec,
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format the model is asked for (e.g., "text", "json")
    pub format: String,
}

/// A rendered prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Rendered text sent to the model
    pub text: String,
}
