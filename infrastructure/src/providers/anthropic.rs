//! Anthropic messages API adapter.

use super::http::{check_request, clamp_max_tokens, clamp_temperature, send_json};
use super::{ProviderAdapter, ProviderSetupError, build_client};
use async_trait::async_trait;
use bookwright_application::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions};
use bookwright_domain::{AnthropicProviderConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const MAX_TEMPERATURE: f32 = 1.0;

pub struct AnthropicAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    api_version: String,
}

impl AnthropicAdapter {
    pub fn new(config: &AnthropicProviderConfig) -> Result<Self, ProviderSetupError> {
        Ok(Self {
            client: build_client(ProviderKind::Anthropic, config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_version: config.api_version.clone(),
        })
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a str,
        options: &GenerationOptions<'a>,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: clamp_max_tokens(options.max_tokens, self.max_tokens),
            temperature: clamp_temperature(options.temperature, MAX_TEMPERATURE),
            system: options.system_prompt,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

fn into_generated(response: MessagesResponse) -> Result<GeneratedText, GatewayError> {
    if response.stop_reason.as_deref() == Some("max_tokens") {
        warn!("Anthropic stopped at the token limit; text may be truncated");
    }
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(GatewayError::MalformedResponse(
            "anthropic returned no text content".to_string(),
        ));
    }

    let generated = GeneratedText::new(text);
    Ok(match response.usage {
        Some(u) => generated.with_usage(u.input_tokens, u.output_tokens),
        None => generated,
    })
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        check_request(ProviderKind::Anthropic, prompt, options)?;
        let body = self.build_request(prompt, options);
        debug!(
            provider = "anthropic",
            model = %self.model,
            prompt_bytes = prompt.len(),
            max_tokens = body.max_tokens,
            "Sending messages request"
        );

        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", options.credential.secret().expose())
            .header("anthropic-version", &self.api_version)
            .json(&body);
        let response: MessagesResponse = send_json(ProviderKind::Anthropic, request).await?;
        into_generated(response)
    }
}
