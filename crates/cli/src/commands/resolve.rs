//! Resolve command handler.
//!
//! Shows the candidate keys a question produces and the URLs they map to,
//! without fetching or answering.

use clap::Args;
use ltipp_core::{config::AppConfig, AppResult};
use ltipp_knowledge::{AnswerPipeline, Resolution};

/// Show which catalog entries a question resolves to
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// The question to resolve
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResolveCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing resolve command");

        let pipeline = AnswerPipeline::from_config(config)?;
        let resolved = pipeline.resolve(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            return Ok(());
        }

        if resolved.resolutions.is_empty() {
            println!("No candidate keys extracted");
        } else {
            println!("Candidates:");
            for resolution in &resolved.resolutions {
                println!("  {}", describe(resolution));
            }
        }

        println!();
        println!("URLs:");
        for url in &resolved.urls {
            println!("  {}", url);
        }

        Ok(())
    }
}

fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Exact { candidate } => format!("{} (exact)", candidate),
        Resolution::Fuzzy {
            candidate,
            matched,
            score,
        } => format!("{} -> {} (score {})", candidate, matched, score),
        Resolution::Miss {
            candidate,
            best_score,
        } => format!("{} (no match, best score {})", candidate, best_score),
    }
}
