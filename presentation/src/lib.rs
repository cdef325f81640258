//! Presentation layer for bookwright
//!
//! This crate contains CLI definitions, output formatters and progress
//! reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{BookArgs, Cli, Command, OutputFormat};
pub use output::console::{ConsoleFormatter, JsonFormatter};
pub use output::formatter::{OutputFormatter, formatter_for};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
