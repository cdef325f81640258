//! Shared fixtures for the GenerateBook tests.

use super::GenerateBookUseCase;
use crate::config::{GenerationParams, RateLimitRetry};
use crate::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions, LlmGateway};
use async_trait::async_trait;
use bookwright_domain::{
    BookSpecification, CredentialSet, GenerationSession, Genre, ProviderCredential, ProviderKind,
    Tone,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway returning scripted results in order, recording every prompt.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Self::delayed(script, Duration::ZERO)
    }

    /// Like `new`, but every call takes `delay` before answering.
    pub fn delayed(script: Vec<Result<String, GatewayError>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        assert_eq!(options.credential.provider(), ProviderKind::OpenAi);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay.max(Duration::from_millis(1))).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result.map(GeneratedText::new),
            None => Err(GatewayError::ProviderUnavailable("script exhausted".into())),
        }
    }
}

/// Labelled outline response with `chapters` entries.
pub fn outline_text(chapters: u32) -> String {
    let mut text = String::from("SYNOPSIS: A book about the sea.\n\n");
    for i in 1..=chapters {
        text.push_str(&format!(
            "CHAPTER {i}: Title {i}\nSUMMARY: Summary of chapter {i}.\nKEY POINTS:\n- Point {i}\n\n"
        ));
    }
    text
}

pub fn spec(chapter_count: u32) -> BookSpecification {
    BookSpecification::new(
        "The Quiet Harbor",
        Genre::Mystery,
        "Adults",
        50_000,
        "Secrets of a fishing town",
        chapter_count,
        Tone::Dark,
    )
}

pub fn session_for(spec: BookSpecification) -> GenerationSession {
    let credentials =
        CredentialSet::new().with(ProviderCredential::new(ProviderKind::OpenAi, "sk-test"));
    GenerationSession::new(spec, credentials, ProviderKind::OpenAi).unwrap()
}

pub fn session(chapter_count: u32) -> GenerationSession {
    session_for(spec(chapter_count))
}

/// Fast parameters: no pacing, millisecond backoff.
pub fn test_params() -> GenerationParams {
    GenerationParams::default()
        .with_chapter_pacing(Duration::ZERO)
        .with_provider_timeout(Duration::from_secs(5))
        .with_rate_limit(RateLimitRetry::new(
            Duration::from_millis(1),
            Duration::from_millis(50),
        ))
}

pub fn use_case(gateway: Arc<ScriptedGateway>) -> GenerateBookUseCase<ScriptedGateway> {
    use_case_with(gateway, test_params())
}

pub fn use_case_with(
    gateway: Arc<ScriptedGateway>,
    params: GenerationParams,
) -> GenerateBookUseCase<ScriptedGateway> {
    GenerateBookUseCase::with_params(gateway, params)
}
