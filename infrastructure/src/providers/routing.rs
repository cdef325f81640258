use super::{ProviderAdapter, ProviderSetupError, build_adapters};
use async_trait::async_trait;
use bookwright_application::ports::llm_gateway::{
    GatewayError, GeneratedText, GenerationOptions, LlmGateway,
};
use bookwright_domain::{ProviderConfig, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;

/// [`LlmGateway`] that dispatches each request to the adapter matching the
/// credential's provider.
pub struct RoutingGateway {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl RoutingGateway {
    /// Later adapters replace earlier ones of the same kind.
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            adapters: adapters.into_iter().map(|a| (a.kind(), a)).collect(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderSetupError> {
        Ok(Self::new(build_adapters(config)?))
    }

    /// Providers this gateway can reach, in [`ProviderKind`] order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.adapters.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Model configured for `provider`, if an adapter is registered.
    pub fn model_for(&self, provider: ProviderKind) -> Option<&str> {
        self.adapters.get(&provider).map(|a| a.model())
    }

    fn resolve(&self, provider: ProviderKind) -> Result<&dyn ProviderAdapter, GatewayError> {
        self.adapters
            .get(&provider)
            .map(|a| a.as_ref())
            .ok_or_else(|| {
                GatewayError::InvalidRequest(format!("no adapter registered for {}", provider))
            })
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        self.resolve(options.credential.provider())?
            .generate(prompt, options)
            .await
    }
}
