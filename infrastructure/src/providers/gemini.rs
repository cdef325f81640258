//! Google Gemini `generateContent` adapter.

use super::http::{check_request, clamp_max_tokens, clamp_temperature, send_json};
use super::{ProviderAdapter, ProviderSetupError, build_client};
use async_trait::async_trait;
use bookwright_application::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions};
use bookwright_domain::{GeminiProviderConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const MAX_TEMPERATURE: f32 = 2.0;

pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl GeminiAdapter {
    pub fn new(config: &GeminiProviderConfig) -> Result<Self, ProviderSetupError> {
        Ok(Self {
            client: build_client(ProviderKind::Gemini, config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(
        &self,
        prompt: &'a str,
        options: &GenerationOptions<'a>,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: options.system_prompt.map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: clamp_max_tokens(options.max_tokens, self.max_tokens),
                temperature: clamp_temperature(options.temperature, MAX_TEMPERATURE),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn into_generated(response: GenerateContentResponse) -> Result<GeneratedText, GatewayError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(GatewayError::InvalidRequest(format!(
            "gemini blocked the prompt: {}",
            reason
        )));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        GatewayError::MalformedResponse("gemini response has no candidates".to_string())
    })?;
    match candidate.finish_reason.as_deref() {
        Some("MAX_TOKENS") => warn!("Gemini stopped at the token limit; text may be truncated"),
        Some("SAFETY") | Some("RECITATION") => {
            warn!(reason = ?candidate.finish_reason, "Gemini filtered the response")
        }
        _ => {}
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GatewayError::MalformedResponse(format!(
            "gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let generated = GeneratedText::new(text);
    Ok(match response.usage_metadata {
        Some(u) => generated.with_usage(u.prompt_token_count, u.candidates_token_count),
        None => generated,
    })
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        check_request(ProviderKind::Gemini, prompt, options)?;
        let body = self.build_request(prompt, options);
        debug!(
            provider = "gemini",
            model = %self.model,
            prompt_bytes = prompt.len(),
            max_tokens = body.generation_config.max_output_tokens,
            "Sending generateContent request"
        );

        // Key goes in a header so it never appears in a logged URL.
        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", options.credential.secret().expose())
            .json(&body);
        let response: GenerateContentResponse = send_json(ProviderKind::Gemini, request).await?;
        into_generated(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_server::serve_once;
    use bookwright_domain::{GenerationErrorKind, ProviderCredential};
    use std::time::Duration;

    fn adapter(base_url: &str) -> GeminiAdapter {
        GeminiAdapter::new(&GeminiProviderConfig {
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn credential() -> ProviderCredential {
        ProviderCredential::new(ProviderKind::Gemini, "g-secret")
    }

    #[test]
    fn test_request_shape() {
        let adapter = adapter("https://generativelanguage.googleapis.com/v1beta");
        let credential = credential();
        let options = GenerationOptions::new(&credential, 20_000, 0.5).with_system_prompt("Be kind.");
        let json = serde_json::to_value(adapter.build_request("Write.", &options)).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Write.");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(
            adapter.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_response_extraction() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "The tide "}, {"text": "turned."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 3, "totalTokenCount": 43}
            }"#,
        )
        .unwrap();
        let generated = into_generated(response).unwrap();
        assert_eq!(generated.text, "The tide turned.");
        assert_eq!(generated.usage.unwrap().output_tokens, 3);
    }

    #[test]
    fn test_blocked_prompt_is_invalid_request() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = into_generated(response).unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_candidate_without_text_is_malformed() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        let err = into_generated(response).unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::MalformedResponse);
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_quota_error_uses_retry_delay_detail() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            &[],
            r#"{"error": {"code": 429, "message": "Quota exceeded", "details": [{"retryDelay": "12s"}]}}"#,
        )
        .await;
        let credential = credential();
        let options = GenerationOptions::new(&credential, 50, 0.7);

        let err = adapter(&base_url).generate("Go", &options).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /models/gemini-test:generatecontent"));
        assert!(request.contains("x-goog-api-key: g-secret"));
    }
}
