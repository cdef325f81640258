//! Provider identity, credentials and configuration.
//!
//! The configuration types define the shape of provider settings without
//! depending on any serialization format (TOML, JSON, etc.).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported text-generation providers (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Opaque API secret. Never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for building the outbound auth header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A provider identifier paired with its secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    provider: ProviderKind,
    secret: SecretToken,
}

impl ProviderCredential {
    pub fn new(provider: ProviderKind, secret: impl Into<String>) -> Self {
        Self {
            provider,
            secret: SecretToken::new(secret),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn secret(&self) -> &SecretToken {
        &self.secret
    }
}

/// The credentials configured for one session, at most one per provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    credentials: BTreeMap<ProviderKind, ProviderCredential>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential, replacing any previous one for the same provider.
    /// Blank secrets are ignored.
    pub fn insert(&mut self, credential: ProviderCredential) {
        if credential.secret.is_empty() {
            return;
        }
        self.credentials.insert(credential.provider, credential);
    }

    pub fn with(mut self, credential: ProviderCredential) -> Self {
        self.insert(credential);
        self
    }

    pub fn get(&self, provider: ProviderKind) -> Option<&ProviderCredential> {
        self.credentials.get(&provider)
    }

    pub fn contains(&self, provider: ProviderKind) -> bool {
        self.credentials.contains_key(&provider)
    }

    /// Configured providers, in declaration order of [`ProviderKind`].
    pub fn providers(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.credentials.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

/// Top-level provider configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Default provider name: "openai", "anthropic" or "gemini".
    pub default: Option<String>,
    pub openai: OpenAiProviderConfig,
    pub anthropic: AnthropicProviderConfig,
    pub gemini: GeminiProviderConfig,
}

impl ProviderConfig {
    /// The configured default provider, if it names a known one.
    pub fn default_kind(&self) -> Option<ProviderKind> {
        self.default.as_deref().and_then(|s| s.parse().ok())
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Upper bound for `max_tokens`; larger requests are clamped.
    pub max_tokens: u32,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
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

impl Default for AnthropicProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-sonnet-20240229".to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Google Gemini API provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiProviderConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GeminiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            max_tokens: 8192,
            timeout_secs: 120,
        }
    }
}
