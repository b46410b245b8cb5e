//! Candidate key extraction: ask the model which catalog keys a question is about.

use crate::catalog::Catalog;
use ltipp_core::AppResult;
use ltipp_llm::{LlmClient, LlmRequest};
use ltipp_prompt::{build_prompt, PromptDefinition};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of parsing the extraction model's reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedKeys {
    /// A JSON object with a `keys` field was found
    Keys(Vec<String>),
    /// No usable JSON object in the reply
    Unparseable,
}

impl ParsedKeys {
    /// Candidate keys, with `Unparseable` treated as none.
    pub fn into_keys(self) -> Vec<String> {
        match self {
            Self::Keys(keys) => keys,
            Self::Unparseable => Vec::new(),
        }
    }
}

/// Parse a model reply of the form `{"keys": [...]}`.
///
/// The whole reply is tried first, then the span from the first `{` to the
/// last `}` so prose around the object is tolerated. Non-string entries and
/// blank strings are dropped. A bare string value is taken as a single key.
pub fn parse_keys_reply(raw: &str) -> ParsedKeys {
    let value = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => match embedded_object(raw).and_then(|s| serde_json::from_str(s).ok()) {
            Some(value) => value,
            None => return ParsedKeys::Unparseable,
        },
    };

    let keys = match value.get("keys") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(key)) if !key.trim().is_empty() => vec![key.trim().to_string()],
        Some(Value::String(_)) => Vec::new(),
        _ => return ParsedKeys::Unparseable,
    };

    ParsedKeys::Keys(keys)
}

fn embedded_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Asks the extraction model for the catalog keys a question refers to.
pub struct KeyExtractor {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl KeyExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
        }
    }

    /// Candidate keys for `question`. A malformed reply yields no keys.
    ///
    /// # Errors
    /// Propagates prompt rendering errors and model transport failures.
    pub async fn extract(&self, question: &str, catalog: &Catalog) -> AppResult<Vec<String>> {
        let mut variables = HashMap::new();
        variables.insert("catalogKeys".to_string(), catalog.keys_listing());
        variables.insert("question".to_string(), question.to_string());

        let built = build_prompt(&self.prompt, &variables)?;
        let request = LlmRequest::new(built.text, &self.model);

        let response = self.llm.complete(&request).await?;
        tracing::debug!(reply = %response.content, "Key extraction reply");

        match parse_keys_reply(&response.content) {
            ParsedKeys::Keys(keys) => {
                tracing::info!(?keys, "Extracted candidate keys");
                Ok(keys)
            }
            ParsedKeys::Unparseable => {
                tracing::warn!("Key extraction reply held no keys object, continuing without keys");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{catalog, ScriptedLlm};
    use ltipp_prompt::{builtin_prompt, KEY_EXTRACTION_PROMPT_ID};

    fn keys(items: &[&str]) -> ParsedKeys {
        ParsedKeys::Keys(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_plain_object() {
        assert_eq!(parse_keys_reply(r#"{"keys": ["Aark", "Lido"]}"#), keys(&["Aark", "Lido"]));
    }

    #[test]
    fn test_parse_object_wrapped_in_prose() {
        assert_eq!(
            parse_keys_reply(r#"Sure! {"keys": ["Aark"]} Hope that helps."#),
            keys(&["Aark"])
        );
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\n  \"keys\": [\"Lido\"]\n}\n```";
        assert_eq!(parse_keys_reply(reply), keys(&["Lido"]));
    }

    #[test]
    fn test_parse_drops_non_strings_and_blanks() {
        assert_eq!(
            parse_keys_reply(r#"{"keys": ["Aark", 3, null, "  ", " Lido "]}"#),
            keys(&["Aark", "Lido"])
        );
    }

    #[test]
    fn test_parse_single_string_value() {
        assert_eq!(parse_keys_reply(r#"{"keys": "Lido"}"#), keys(&["Lido"]));
    }

    #[test]
    fn test_parse_empty_list_is_keys() {
        assert_eq!(parse_keys_reply(r#"{"keys": []}"#), keys(&[]));
    }

    #[test]
    fn test_parse_failures_are_unparseable() {
        assert_eq!(parse_keys_reply("I don't know"), ParsedKeys::Unparseable);
        assert_eq!(parse_keys_reply("} nope {"), ParsedKeys::Unparseable);
        assert_eq!(parse_keys_reply(r#"{"projects": ["Aark"]}"#), ParsedKeys::Unparseable);
        assert_eq!(parse_keys_reply(r#"{"keys": ["Aark"#), ParsedKeys::Unparseable);
        assert_eq!(parse_keys_reply(""), ParsedKeys::Unparseable);
        assert!(ParsedKeys::Unparseable.into_keys().is_empty());
    }

    #[tokio::test]
    async fn test_extract_sends_catalog_keys_to_model() {
        let llm = Arc::new(ScriptedLlm::new().reply("llama3", r#"{"keys": ["Lido"]}"#));
        let extractor = KeyExtractor::new(
            llm.clone(),
            "llama3",
            builtin_prompt(KEY_EXTRACTION_PROMPT_ID).unwrap(),
        );

        let keys = extractor
            .extract("How did Lido do?", &catalog())
            .await
            .unwrap();

        assert_eq!(keys, vec!["Lido".to_string()]);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama3");
        assert!(requests[0].prompt.contains("Aark\nLido"));
        assert!(requests[0].prompt.contains("How did Lido do?"));
    }

    #[tokio::test]
    async fn test_extract_tolerates_garbage_reply() {
        let llm = Arc::new(ScriptedLlm::new().reply("llama3", "no idea, sorry"));
        let extractor = KeyExtractor::new(
            llm,
            "llama3",
            builtin_prompt(KEY_EXTRACTION_PROMPT_ID).unwrap(),
        );

        let keys = extractor.extract("anything", &catalog()).await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_extract_transport_failure_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new().fail("llama3"));
        let extractor = KeyExtractor::new(
            llm,
            "llama3",
            builtin_prompt(KEY_EXTRACTION_PROMPT_ID).unwrap(),
        );

        let err = extractor.extract("anything", &catalog()).await.unwrap_err();
        assert!(err.is_transport());
    }
}
