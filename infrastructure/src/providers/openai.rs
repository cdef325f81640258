//! OpenAI chat completions adapter.

use super::http::{check_request, clamp_max_tokens, clamp_temperature, send_json};
use super::{ProviderAdapter, ProviderSetupError, build_client};
use async_trait::async_trait;
use bookwright_application::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions};
use bookwright_domain::{OpenAiProviderConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const MAX_TEMPERATURE: f32 = 2.0;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiAdapter {
    pub fn new(config: &OpenAiProviderConfig) -> Result<Self, ProviderSetupError> {
        Ok(Self {
            client: build_client(ProviderKind::OpenAi, config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a str,
        options: &GenerationOptions<'a>,
    ) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: clamp_max_tokens(options.max_tokens, self.max_tokens),
            temperature: clamp_temperature(options.temperature, MAX_TEMPERATURE),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn into_generated(response: ChatCompletionResponse) -> Result<GeneratedText, GatewayError> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        GatewayError::MalformedResponse("openai response has no choices".to_string())
    })?;
    if choice.finish_reason.as_deref() == Some("length") {
        warn!("OpenAI stopped at the token limit; text may be truncated");
    }
    let text = choice
        .message
        .content
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| GatewayError::MalformedResponse("openai returned no text".to_string()))?;

    let generated = GeneratedText::new(text);
    Ok(match response.usage {
        Some(u) => generated.with_usage(u.prompt_tokens, u.completion_tokens),
        None => generated,
    })
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        check_request(ProviderKind::OpenAi, prompt, options)?;
        let body = self.build_request(prompt, options);
        debug!(
            provider = "openai",
            model = %self.model,
            prompt_bytes = prompt.len(),
            max_tokens = body.max_tokens,
            "Sending chat completion request"
        );

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(options.credential.secret().expose())
            .json(&body);
        let response: ChatCompletionResponse = send_json(ProviderKind::OpenAi, request).await?;
        into_generated(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server::serve_once;
    use bookwright_domain::{GenerationErrorKind, ProviderCredential};
    use std::time::Duration;

    fn adapter(base_url: &str) -> OpenAiAdapter {
        OpenAiAdapter::new(&OpenAiProviderConfig {
            base_url: base_url.to_string(),
            model: "gpt-test".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn credential() -> ProviderCredential {
        ProviderCredential::new(ProviderKind::OpenAi, "sk-test-secret")
    }

    #[test]
    fn test_request_shape() {
        let adapter = adapter("https://api.openai.com/v1/");
        let credential = credential();
        let options = GenerationOptions::new(&credential, 100_000, 3.5).with_system_prompt("Be brief.");
        let json = serde_json::to_value(adapter.build_request("Write.", &options)).unwrap();

        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["temperature"], 2.0);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be brief.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Write.");
        assert_eq!(adapter.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_response_extraction() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "Once upon a time"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            }"#,
        )
        .unwrap();
        let generated = into_generated(response).unwrap();
        assert_eq!(generated.text, "Once upon a time");
        let usage = generated.usage.unwrap();
        assert_eq!((usage.input_tokens, usage.output_tokens), (12, 4));
    }

    #[test]
    fn test_empty_response_is_malformed() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(
            into_generated(response).unwrap_err().kind(),
            GenerationErrorKind::MalformedResponse
        );

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(
            into_generated(response).unwrap_err().kind(),
            GenerationErrorKind::MalformedResponse
        );
    }

    #[tokio::test]
    async fn test_generate_sends_bearer_auth() {
        let (base_url, server) = serve_once(
            "200 OK",
            &[],
            r#"{"choices": [{"message": {"content": "Hello"}, "finish_reason": "stop"}]}"#,
        )
        .await;
        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);

        let generated = adapter(&base_url).generate("Say hello", &options).await.unwrap();
        assert_eq!(generated.text, "Hello");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test-secret"));
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after() {
        let (base_url, _server) = serve_once(
            "429 Too Many Requests",
            &[("retry-after", "2")],
            r#"{"error": {"message": "Rate limit reached"}}"#,
        )
        .await;
        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);

        let err = adapter(&base_url).generate("Hi", &options).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert!(!err.to_string().contains("sk-test-secret"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_failure() {
        let (base_url, _server) = serve_once(
            "401 Unauthorized",
            &[],
            r#"{"error": {"message": "Incorrect API key provided"}}"#,
        )
        .await;
        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);

        let err = adapter(&base_url).generate("Hi", &options).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::AuthenticationFailed);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);
        let err = adapter(&format!("http://{}", addr))
            .generate("Hi", &options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::ProviderUnavailable);
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let (base_url, _server) = serve_once("200 OK", &[], "<html>not json</html>").await;
        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);

        let err = adapter(&base_url).generate("Hi", &options).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::MalformedResponse);
    }
}
