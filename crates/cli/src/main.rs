//! LTIPP Assistant CLI
//!
//! Main entry point for the `ltipp` command-line tool.
//! Answers questions about LTIPP grant recipients from the command line or
//! over HTTP.

mod commands;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, ContextCommand, ResolveCommand, ServeCommand};
use ltipp_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// LTIPP Assistant - questions about incentive program recipients
#[derive(Parser, Debug)]
#[command(name = "ltipp")]
#[command(about = "Answer questions about LTIPP grant recipients", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "LTIPP_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "LTIPP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Model that picks catalog keys out of a question
    #[arg(long, global = true, env = "LTIPP_EXTRACTION_MODEL")]
    extraction_model: Option<String>,

    /// Model that writes the final answer
    #[arg(long, global = true, env = "LTIPP_ANSWER_MODEL")]
    answer_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single question
    Ask(AskCommand),

    /// Show which catalog entries a question resolves to
    Resolve(ResolveCommand),

    /// Print the retrieved context for a question without answering it
    Context(ContextCommand),

    /// Run the HTTP answering service
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Workspace and config file decide which YAML layer is read
    let config = AppConfig::load_from(cli.workspace, cli.config)
        .context("Failed to load configuration")?;

    let config = config.with_overrides(
        cli.extraction_model,
        cli.answer_model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.json_logs)
        .context("Failed to initialise logging")?;

    config.validate().context("Invalid configuration")?;

    tracing::info!("LTIPP assistant starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Ollama endpoint: {}", config.llm.endpoint);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Resolve(_) => "resolve",
        Commands::Context(_) => "context",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Resolve(cmd) => cmd.execute(&config).await,
        Commands::Context(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}
