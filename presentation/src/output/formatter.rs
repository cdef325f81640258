//! Output formatter trait

use crate::cli::commands::OutputFormat;
use crate::output::console::{ConsoleFormatter, JsonFormatter};
use bookwright_application::FullBookOutcome;
use bookwright_domain::{Chapter, Outline};

/// Trait for rendering generation results
pub trait OutputFormatter {
    fn format_outline(&self, outline: &Outline) -> String;

    fn format_chapter(&self, chapter: &Chapter) -> String;

    /// A full-book run, including how it ended
    fn format_book(&self, outcome: &FullBookOutcome) -> String;
}

/// Formatter for the selected output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
