//! Configuration loading for bookwright
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `BOOKWRIGHT_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./bookwright.toml` or `./.bookwright.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/bookwright/config.toml`
//!    (fallback `~/.config/bookwright/config.toml`)
//! 5. Default values

mod credentials;
mod file_config;
mod issue;
mod loader;

pub use credentials::{api_key_env, resolve_credentials, resolve_with};
pub use file_config::{
    FileAnthropicConfig, FileConfig, FileGeminiConfig, FileGenerationConfig, FileOpenAiConfig,
    FileOutputConfig, FileOutputFormat, FileProvidersConfig,
};
pub use issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use loader::ConfigLoader;

use bookwright_domain::GenerationErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(Box<figment::Error>),
}

impl ConfigError {
    pub fn kind(&self) -> GenerationErrorKind {
        GenerationErrorKind::InvalidRequest
    }
}
