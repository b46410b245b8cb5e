//! Ask command handler.
//!
//! Runs one question through the answer pipeline and prints the result.

use clap::Args;
use ltipp_core::{config::AppConfig, AppError, AppResult};
use ltipp_knowledge::AnswerPipeline;
use std::path::PathBuf;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output the answer with its URLs and sources as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question()?;
        let pipeline = AnswerPipeline::from_config(config)?;
        let result = pipeline.answer(&question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.answer);
            if config.verbose && !result.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &result.sources {
                    println!("  {}", source);
                }
            }
        }

        Ok(())
    }

    fn question(&self) -> AppResult<String> {
        if let Some(question) = &self.question {
            return Ok(question.clone());
        }

        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).map_err(|e| {
                AppError::InvalidInput(format!("Failed to read question from {:?}: {}", path, e))
            });
        }

        Err(AppError::InvalidInput("No question provided".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn command(question: Option<&str>, file: Option<PathBuf>) -> AskCommand {
        AskCommand {
            question: question.map(str::to_string),
            file,
            json: false,
        }
    }

    #[test]
    fn test_question_from_argument() {
        let cmd = command(Some("How did Lido do?"), None);
        assert_eq!(cmd.question().unwrap(), "How did Lido do?");
    }

    #[test]
    fn test_question_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "What did Aark receive?").unwrap();

        let cmd = command(None, Some(file.path().to_path_buf()));
        assert_eq!(cmd.question().unwrap(), "What did Aark receive?");
    }

    #[test]
    fn test_missing_question() {
        let cmd = command(None, None);
        assert!(matches!(cmd.question(), Err(AppError::InvalidInput(_))));
    }
}
