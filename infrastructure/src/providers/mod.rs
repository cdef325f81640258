//! Provider adapters
//!
//! One [`ProviderAdapter`] per [`ProviderKind`]. Each adapter translates a
//! generation request into its provider's wire format and classifies every
//! failure into the shared [`GatewayError`] taxonomy.

pub mod anthropic;
pub mod gemini;
mod http;
pub mod openai;
pub mod routing;

use async_trait::async_trait;
use bookwright_application::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions};
use bookwright_domain::{ProviderConfig, ProviderKind};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use routing::RoutingGateway;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    fn model(&self) -> &str;
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError>;
}

/// Failure while constructing an adapter.
#[derive(Error, Debug)]
pub enum ProviderSetupError {
    #[error("Failed to build HTTP client for {provider}: {source}")]
    HttpClient {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },
}

pub(crate) fn build_client(
    provider: ProviderKind,
    timeout_secs: u64,
) -> Result<reqwest::Client, ProviderSetupError> {
    let builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("bookwright/", env!("CARGO_PKG_VERSION")));
    // Tests talk to a loopback server; keep proxy settings out of the way.
    #[cfg(test)]
    let builder = builder.no_proxy();
    builder
        .build()
        .map_err(|source| ProviderSetupError::HttpClient { provider, source })
}

/// Build an adapter for every supported provider.
///
/// Adapters hold no credentials; the secret arrives with each request.
pub fn build_adapters(
    config: &ProviderConfig,
) -> Result<Vec<Arc<dyn ProviderAdapter>>, ProviderSetupError> {
    Ok(vec![
        Arc::new(OpenAiAdapter::new(&config.openai)?),
        Arc::new(AnthropicAdapter::new(&config.anthropic)?),
        Arc::new(GeminiAdapter::new(&config.gemini)?),
    ])
}
