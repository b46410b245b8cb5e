//! Prompt loader: built-in definitions plus workspace overrides.

use crate::types::PromptDefinition;
use crate::{ANSWER_PROMPT_ID, KEY_EXTRACTION_PROMPT_ID};
use ltipp_core::{AppError, AppResult};
use std::path::Path;

const BUILTIN_KEY_EXTRACTION: &str = include_str!("../prompts/keys.extract.yml");
const BUILTIN_ANSWER: &str = include_str!("../prompts/answer.synthesize.yml");

/// The two prompts the answering pipeline needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub key_extraction: PromptDefinition,
    pub answer: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Ok(Self {
            key_extraction: builtin_prompt(KEY_EXTRACTION_PROMPT_ID)?,
            answer: builtin_prompt(ANSWER_PROMPT_ID)?,
        })
    }

    /// Built-in prompts, each replaced by `<prompts_dir>/<id>.yml` when that file exists.
    pub fn load(prompts_dir: &Path) -> AppResult<Self> {
        Ok(Self {
            key_extraction: load_prompt(Some(prompts_dir), KEY_EXTRACTION_PROMPT_ID)?,
            answer: load_prompt(Some(prompts_dir), ANSWER_PROMPT_ID)?,
        })
    }
}

/// Parse one of the prompts compiled into the binary.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let source = match prompt_id {
        KEY_EXTRACTION_PROMPT_ID => BUILTIN_KEY_EXTRACTION,
        ANSWER_PROMPT_ID => BUILTIN_ANSWER,
        other => {
            return Err(AppError::Prompt(format!(
                "No built-in prompt with id '{}'",
                other
            )))
        }
    };

    let definition: PromptDefinition = serde_yaml::from_str(source).map_err(|e| {
        AppError::Prompt(format!("Failed to parse built-in prompt '{}': {}", prompt_id, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Load a prompt definition by ID.
///
/// Looks for `<id>.yml` in `prompts_dir` first and falls back to the built-in
/// definition.
///
/// # Example
/// ```no_run
/// use ltipp_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Some(Path::new(".ltipp/prompts")), "keys.extract")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    let override_file = prompts_dir.map(|dir| dir.join(format!("{}.yml", prompt_id)));

    let Some(prompt_file) = override_file.filter(|path| path.exists()) else {
        tracing::debug!("Using built-in prompt '{}'", prompt_id);
        return builtin_prompt(prompt_id);
    };

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' has an empty template",
            def.id
        )));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for variable in &def.variables {
        let placeholder = format!("{{{{{}}}}}", variable);
        if !def.template.contains(&placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' declares variable '{}' but its template never uses {}",
                def.id, variable, placeholder
            )));
        }
    }

    crate::builder::check_template(&def.template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtin_prompts_are_valid() {
        let set = PromptSet::builtin().unwrap();
        assert_eq!(set.key_extraction.id, KEY_EXTRACTION_PROMPT_ID);
        assert_eq!(set.key_extraction.output.format, "json");
        assert_eq!(set.answer.id, ANSWER_PROMPT_ID);
        assert!(set.answer.template.contains("Answer to this prompt"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("nope").is_err());
    }

    #[test]
    fn test_override_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            ANSWER_PROMPT_ID,
            r#"
id: answer.synthesize
title: Terse answer
apiVersion: "1.1"
variables: [context, question]
template: "Context: {{context}}\nQuestion: {{question}}\nAnswer briefly."
output:
  format: text
"#,
        );

        let set = PromptSet::load(temp_dir.path()).unwrap();
        assert_eq!(set.answer.title, "Terse answer");
        assert_eq!(set.key_extraction.title, "Catalog key extraction");
    }

    #[test]
    fn test_missing_override_dir_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(Some(&temp_dir.path().join("absent")), KEY_EXTRACTION_PROMPT_ID);
        assert!(prompt.is_ok());
    }

    #[test]
    fn test_override_with_wrong_id_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            ANSWER_PROMPT_ID,
            r#"
id: something.else
title: Wrong
apiVersion: "1.0"
template: "{{question}}"
output:
  format: text
"#,
        );

        assert!(load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).is_err());
    }

    #[test]
    fn test_declared_variable_must_appear() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            ANSWER_PROMPT_ID,
            r#"
id: answer.synthesize
title: Forgets context
apiVersion: "1.0"
variables: [context, question]
template: "{{question}}"
output:
  format: text
"#,
        );

        let err = load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).unwrap_err();
        assert!(err.to_string().contains("context"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), ANSWER_PROMPT_ID, "invalid: yaml: content:");

        assert!(load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).is_err());
    }
}
