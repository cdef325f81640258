//! Provider configuration from TOML (`[providers]` section)

use crate::config::issue::ConfigIssue;
use bookwright_domain::{
    AnthropicProviderConfig, GeminiProviderConfig, OpenAiProviderConfig, ProviderConfig,
    ProviderKind,
};
use serde::{Deserialize, Serialize};

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can point at any compatible endpoint).
    pub base_url: String,
    pub model: String,
    /// Upper bound for max tokens per response.
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        let d = OpenAiProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            model: d.model,
            max_tokens: d.max_tokens,
            timeout_secs: d.timeout_secs,
        }
    }
}

impl FileOpenAiConfig {
    fn to_domain(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            api_key_env: self.api_key_env.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        let d = AnthropicProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            model: d.model,
            max_tokens: d.max_tokens,
            timeout_secs: d.timeout_secs,
            api_version: d.api_version,
        }
    }
}

impl FileAnthropicConfig {
    fn to_domain(&self) -> AnthropicProviderConfig {
        AnthropicProviderConfig {
            api_key_env: self.api_key_env.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            api_version: self.api_version.clone(),
        }
    }
}

/// Google Gemini API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        let d = GeminiProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            model: d.model,
            max_tokens: d.max_tokens,
            timeout_secs: d.timeout_secs,
        }
    }
}

impl FileGeminiConfig {
    fn to_domain(&self) -> GeminiProviderConfig {
        GeminiProviderConfig {
            api_key_env: self.api_key_env.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Default provider: "openai", "anthropic" or "gemini".
    pub default: Option<String>,
    pub openai: FileOpenAiConfig,
    pub anthropic: FileAnthropicConfig,
    pub gemini: FileGeminiConfig,
}

impl FileProvidersConfig {
    /// Convert to the domain [`ProviderConfig`].
    ///
    /// An unknown `default` is dropped with a warning.
    pub fn to_provider_config(&self) -> (ProviderConfig, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let default = match self.default.as_deref() {
            Some(name) if name.parse::<ProviderKind>().is_err() => {
                let valid: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
                issues.push(ConfigIssue::invalid_enum(
                    "providers.default",
                    name,
                    &valid,
                    "first configured provider",
                ));
                None
            }
            other => other.map(str::to_string),
        };

        for (field, max_tokens, timeout) in [
            ("providers.openai", self.openai.max_tokens, self.openai.timeout_secs),
            ("providers.anthropic", self.anthropic.max_tokens, self.anthropic.timeout_secs),
            ("providers.gemini", self.gemini.max_tokens, self.gemini.timeout_secs),
        ] {
            if max_tokens == 0 {
                issues.push(ConfigIssue::zero(&format!("{}.max_tokens", field), 1));
            }
            if timeout == 0 {
                issues.push(ConfigIssue::zero(&format!("{}.timeout_secs", field), 1));
            }
        }

        let config = ProviderConfig {
            default,
            openai: self.openai.to_domain(),
            anthropic: self.anthropic.to_domain(),
            gemini: self.gemini.to_domain(),
        };
        (config, issues)
    }
}
