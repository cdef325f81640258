//! CLI command definitions

use bookwright_domain::{BookSpecification, Genre, ProviderKind, Tone};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

/// CLI arguments for bookwright
#[derive(Parser, Debug)]
#[command(name = "bookwright")]
#[command(author, version, about = "Generate a book outline and chapters with an LLM provider")]
#[command(long_about = r#"
Bookwright turns a short book description into an outline and chapters.

Commands:
  outline       Plan the book chapter by chapter
  chapter <N>   Write chapter N (optionally after planning the outline)
  book          Plan the outline, then write every chapter in order

API keys are read from OPENAI_API_KEY, ANTHROPIC_API_KEY and GEMINI_API_KEY
unless the configuration names other variables.

Configuration files are loaded from (in priority order):
1. BOOKWRIGHT_<SECTION>__<KEY>            Environment overrides
2. --config <path>                        Explicit config file
3. ./bookwright.toml                      Project-level config
4. ~/.config/bookwright/config.toml       Global config

Example:
  bookwright outline --title "The Quiet Harbor" --genre mystery --theme "Secrets of a fishing town" --chapters 5
  bookwright book --title "Tidewater" --genre fantasy --theme "A drowned kingdom" --tone dark -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub book: BookArgs,

    /// Provider to generate with (openai, anthropic, gemini)
    #[arg(short, long, global = true, value_parser = parse_provider)]
    pub provider: Option<ProviderKind>,

    /// Output format (defaults to the configured format, then text)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for daily-rotated diagnostic log files
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Append structured generation events (JSONL) to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub event_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate the book outline
    Outline,
    /// Generate a single chapter
    Chapter {
        /// 1-based chapter number
        index: u32,
        /// Plan the outline first so the chapter follows it
        #[arg(long)]
        with_outline: bool,
    },
    /// Generate the outline and every chapter
    Book,
}

/// Description of the book to generate.
#[derive(Args, Debug, Clone)]
pub struct BookArgs {
    /// Book title
    #[arg(long, global = true)]
    pub title: Option<String>,

    /// Genre (fiction, mystery, fantasy, non-fiction, ...)
    #[arg(short, long, global = true, default_value = "fiction", value_parser = parse_genre)]
    pub genre: Genre,

    /// Intended readers
    #[arg(long, global = true, default_value = "General readers")]
    pub audience: String,

    /// Target length of the whole book, in words
    #[arg(long, global = true, default_value_t = 50_000)]
    pub length: u32,

    /// Central theme or premise
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Number of chapters
    #[arg(short, long, global = true, default_value_t = 10)]
    pub chapters: u32,

    /// Narrative tone (named tone or free text)
    #[arg(short, long, global = true, default_value = "engaging", value_parser = parse_tone)]
    pub tone: Tone,

    /// Additional instructions for the writer
    #[arg(long, global = true)]
    pub details: Option<String>,

    /// Word target per chapter (derived from --length when omitted)
    #[arg(long, global = true)]
    pub words_per_chapter: Option<u32>,
}

impl BookArgs {
    /// Assemble the specification. Range checks happen when the session is
    /// created.
    pub fn to_specification(&self) -> Result<BookSpecification, String> {
        let title = self
            .title
            .clone()
            .ok_or_else(|| "--title is required".to_string())?;
        let theme = self
            .theme
            .clone()
            .ok_or_else(|| "--theme is required".to_string())?;

        let mut spec = BookSpecification::new(
            title,
            self.genre,
            self.audience.clone(),
            self.length,
            theme,
            self.chapters,
            self.tone.clone(),
        );
        if let Some(details) = &self.details {
            spec = spec.with_additional_details(details.clone());
        }
        if let Some(words) = self.words_per_chapter {
            spec = spec.with_words_per_chapter(words);
        }
        Ok(spec)
    }
}

fn parse_provider(s: &str) -> Result<ProviderKind, String> {
    s.parse()
}

fn parse_genre(s: &str) -> Result<Genre, String> {
    s.parse::<Genre>().map_err(|e| e.to_string())
}

fn parse_tone(s: &str) -> Result<Tone, String> {
    s.parse::<Tone>().map_err(|e| e.to_string())
}
