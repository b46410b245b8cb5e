//! Command handlers for the CLI.

pub mod ask;
pub mod context;
pub mod resolve;
pub mod serve;

pub use ask::AskCommand;
pub use context::ContextCommand;
pub use resolve::ResolveCommand;
pub use serve::ServeCommand;
