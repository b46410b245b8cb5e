//! Context command handler.
//!
//! Prints the passages the answer model would be given for a question.

use clap::Args;
use ltipp_core::{config::AppConfig, AppResult};
use ltipp_knowledge::AnswerPipeline;

/// Print the retrieved context for a question without answering it
#[derive(Args, Debug)]
pub struct ContextCommand {
    /// The question to retrieve context for
    pub question: String,
}

impl ContextCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing context command");

        let pipeline = AnswerPipeline::from_config(config)?;
        let context = pipeline.context(&self.question).await?;

        if context.is_empty() {
            tracing::warn!("No context retrieved");
        } else {
            println!("{}", context);
        }

        Ok(())
    }
}
