//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! convert into the domain/application types the engine runs on.

mod generation;
mod output;
mod providers;

pub use generation::FileGenerationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileAnthropicConfig, FileGeminiConfig, FileOpenAiConfig, FileProvidersConfig};

use super::issue::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider endpoints, models and key sources
    pub providers: FileProvidersConfig,
    /// Token budgets, timeouts, pacing and policies
    pub generation: FileGenerationConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Covers unknown provider names, unknown policy values and zero limits.
    /// Every issue is a warning; the affected value falls back to its default.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.providers.to_provider_config().1);
        issues.extend(self.generation.to_generation_params().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::issue::Severity;
    use bookwright_domain::ProviderKind;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[providers]
default = "gemini"

[providers.gemini]
model = "gemini-1.5-pro"

[generation]
chapter_max_tokens = 3500
summary_fallback_chars = 400

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (providers, _) = config.providers.to_provider_config();
        assert_eq!(providers.default_kind(), Some(ProviderKind::Gemini));
        assert_eq!(providers.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.generation.chapter_max_tokens, 3500);
        assert_eq!(config.generation.summary_fallback_chars, 400);
        assert_eq!(config.output.format, Some(FileOutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[generation]\ntemperature = 1.1\n").unwrap();
        assert_eq!(config.generation.temperature, 1.1);
        // Defaults should apply
        assert_eq!(config.generation.outline_max_tokens, 4000);
        assert!(config.providers.default.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let toml_str = r#"
[providers]
default = "mistral"

[generation]
chapter_max_tokens = 0
outline_policy = "sometimes"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }
}
