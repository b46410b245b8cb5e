//! Logging infrastructure for the LTIPP assistant.
//!
//! All logs are emitted to stderr so stdout stays reserved for answers.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the global tracing subscriber.
///
/// # Arguments
/// * `log_level` - Filter directive override (e.g., "debug", "ltipp_knowledge=trace")
/// * `no_color` - Disable ANSI colors
/// * `json` - Emit one JSON object per event instead of human-readable lines
///
/// # Example
/// ```no_run
/// use ltipp_core::logging::init_logging;
///
/// init_logging(Some("info"), false, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool, json: bool) -> AppResult<()> {
    let env_filter = build_filter(log_level)?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(!no_color && std::env::var("NO_COLOR").is_err()),
            )
            .try_init()
    };

    result.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

/// Resolve the filter: explicit level, then `RUST_LOG`, then `info`.
fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))
}
