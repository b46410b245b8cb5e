//! Serve command handler.

use crate::server::{self, AppState};
use clap::Args;
use ltipp_core::{config::AppConfig, AppResult};
use ltipp_knowledge::{AnswerPipeline, ReportCache};
use std::sync::Arc;

/// Run the HTTP answering service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (host:port), overrides the configured one
    #[arg(short, long, env = "LTIPP_BIND")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let pipeline = AnswerPipeline::from_config(config)?;
        let reports = ReportCache::new(config.report_cache_dir(), config.server.report_count);

        tracing::info!(
            catalog_keys = pipeline.catalog().len(),
            reports = %reports.dir().display(),
            "Service ready"
        );

        let state = AppState {
            pipeline: Arc::new(pipeline),
            reports: Arc::new(reports),
        };

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        server::serve(state, bind).await
    }
}
