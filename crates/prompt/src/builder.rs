//! Prompt builder: renders a definition's Handlebars template.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use ltipp_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Every variable the definition declares must be present in `variables`;
/// values are inserted verbatim (no HTML escaping).
///
/// # Example
/// ```no_run
/// use ltipp_prompt::{build_prompt, builtin_prompt, ANSWER_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(ANSWER_PROMPT_ID)?;
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "Lido requested 4M ARB.".to_string());
/// vars.insert("question".to_string(), "How much did Lido request?".to_string());
///
/// let built = build_prompt(&def, &vars)?;
/// println!("{}", built.text);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if let Some(missing) = definition
        .variables
        .iter()
        .find(|name| !variables.contains_key(name.as_str()))
    {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' requires variable '{}'",
            definition.id, missing
        )));
    }

    let text = render_template(&definition.template, variables)?;

    Ok(BuiltPrompt {
        source_prompt_id: definition.id.clone(),
        text,
    })
}

/// Check that a template compiles.
pub(crate) fn check_template(template: &str) -> AppResult<()> {
    registry_with(template).map(|_| ())
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    registry_with(template)?
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

fn registry_with(template: &str) -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text; documents routinely contain & and <
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_prompt;
    use crate::{ANSWER_PROMPT_ID, KEY_EXTRACTION_PROMPT_ID};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_answer_prompt() {
        let def = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        let built = build_prompt(
            &def,
            &vars(&[("context", "Aark & Lido <data>"), ("question", "Who?")]),
        )
        .unwrap();

        assert_eq!(
            built.text,
            "Using this data: Aark & Lido <data>. Answer to this prompt: Who?"
        );
        assert_eq!(built.source_prompt_id, ANSWER_PROMPT_ID);
    }

    #[test]
    fn test_render_key_extraction_prompt() {
        let def = builtin_prompt(KEY_EXTRACTION_PROMPT_ID).unwrap();
        let built = build_prompt(
            &def,
            &vars(&[
                ("catalogKeys", "Aark\nLido"),
                ("question", "How did Lido do?"),
            ]),
        )
        .unwrap();

        assert!(built.text.contains("Aark\nLido"));
        assert!(built.text.contains("\"keys\""));
        assert!(built
            .text
            .trim_end()
            .ends_with("provide the JSON object: How did Lido do?"));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let def = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        let result = build_prompt(&def, &vars(&[("question", "Who?")]));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_check_template_rejects_unclosed_block() {
        assert!(check_template("{{#if question}}open").is_err());
        assert!(check_template("{{question}}").is_ok());
    }
}
