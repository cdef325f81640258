//! LLM Gateway port
//!
//! Defines the single capability the orchestrator needs from a provider:
//! turn a prompt into text. Implementations (adapters) live in the
//! infrastructure layer.

use async_trait::async_trait;
use bookwright_domain::{GenerationErrorKind, ProviderCredential};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a generation call, already classified into
/// the uniform taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay advised by the provider, if it sent one.
        retry_after: Option<Duration>,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GatewayError::AuthenticationFailed(_) => GenerationErrorKind::AuthenticationFailed,
            GatewayError::RateLimited { .. } => GenerationErrorKind::RateLimited,
            GatewayError::Timeout(_) => GenerationErrorKind::Timeout,
            GatewayError::InvalidRequest(_) => GenerationErrorKind::InvalidRequest,
            GatewayError::ProviderUnavailable(_) => GenerationErrorKind::ProviderUnavailable,
            GatewayError::MalformedResponse(_) => GenerationErrorKind::MalformedResponse,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        GatewayError::RateLimited {
            message: message.into(),
            retry_after,
        }
    }
}

/// Per-call generation options.
///
/// Numeric values are requests; adapters clamp them into the provider's
/// documented range.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions<'a> {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Credential to authenticate with; also selects the provider.
    pub credential: &'a ProviderCredential,
    pub system_prompt: Option<&'a str>,
}

impl<'a> GenerationOptions<'a> {
    pub fn new(credential: &'a ProviderCredential, max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            credential,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: &'a str) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }
}

/// Token counts reported by the provider. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw text returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.usage = Some(TokenUsage {
            input_tokens,
            output_tokens,
        });
        self
    }
}

/// Gateway for text generation
///
/// The provider is chosen by `options.credential`.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError>;
}
