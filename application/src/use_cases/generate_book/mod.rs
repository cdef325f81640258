//! Generate Book use case
//!
//! Sequences outline-then-chapter generation against one
//! [`GenerationSession`](bookwright_domain::GenerationSession):
//!
//! | Operation            | Provider calls                      | Session mutation          |
//! |----------------------|-------------------------------------|---------------------------|
//! | `create_outline`     | 1, plus 1 strict re-prompt on count mismatch | outline replaced |
//! | `generate_chapter`   | 1, plus 1 retry when rate limited   | chapter `i` overwritten   |
//! | `generate_full_book` | outline (if absent), then chapters in order | as above          |
//!
//! Operations take `&mut GenerationSession`, so at most one runs against a
//! session at a time. Share a session across tasks with [`SessionHandle`].

mod chapter;
mod full_book;
mod outline;
mod session_handle;
mod types;

#[cfg(test)]
mod test_support;

pub use session_handle::SessionHandle;
pub use types::{BookStatus, ChapterFailure, FullBookOutcome, GenerateBookError};

use crate::config::GenerationParams;
use crate::ports::generation_logger::{GenerationEvent, GenerationLogger, NoGenerationLogger};
use crate::ports::llm_gateway::{GatewayError, GeneratedText, GenerationOptions, LlmGateway};
use crate::ports::progress::BookProgressNotifier;
use bookwright_domain::ContinuityTracker;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Use case for generating a book outline and its chapters
pub struct GenerateBookUseCase<G: LlmGateway + 'static> {
    pub(super) gateway: Arc<G>,
    pub(super) params: GenerationParams,
    pub(super) tracker: ContinuityTracker,
    pub(super) logger: Arc<dyn GenerationLogger>,
}

impl<G: LlmGateway + 'static> Clone for GenerateBookUseCase<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            params: self.params.clone(),
            tracker: self.tracker,
            logger: self.logger.clone(),
        }
    }
}

impl<G: LlmGateway + 'static> GenerateBookUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_params(gateway, GenerationParams::default())
    }

    pub fn with_params(gateway: Arc<G>, params: GenerationParams) -> Self {
        Self {
            gateway,
            tracker: ContinuityTracker::new(params.summary_fallback_chars),
            params,
            logger: Arc::new(NoGenerationLogger),
        }
    }

    /// Set a generation event logger for structured event recording.
    pub fn with_logger(mut self, logger: Arc<dyn GenerationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// One provider call bounded by `provider_timeout`.
    async fn call_once(
        &self,
        prompt: &str,
        options: &GenerationOptions<'_>,
    ) -> Result<GeneratedText, GatewayError> {
        let timeout = self.params.provider_timeout;
        match tokio::time::timeout(timeout, self.gateway.generate(prompt, options)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(format!(
                "no response within {}s",
                timeout.as_secs_f32()
            ))),
        }
    }

    /// Provider call with the rate-limit retry policy applied.
    ///
    /// `stage` names the call in logs ("outline", "chapter").
    pub(super) async fn call_provider(
        &self,
        stage: &'static str,
        index: Option<u32>,
        prompt: &str,
        options: &GenerationOptions<'_>,
        progress: &dyn BookProgressNotifier,
    ) -> Result<GeneratedText, GatewayError> {
        let provider = options.credential.provider();
        debug!(
            stage,
            provider = %provider,
            prompt_bytes = prompt.len(),
            max_tokens = options.max_tokens,
            "Sending generation request"
        );
        self.logger.log(GenerationEvent::new(
            "generation_request",
            json!({
                "stage": stage,
                "chapter": index,
                "provider": provider.as_str(),
                "prompt_bytes": prompt.len(),
                "max_tokens": options.max_tokens,
            }),
        ));

        let result = match self.call_once(prompt, options).await {
            Err(error) => match self.params.rate_limit.delay_for(&error) {
                Some(delay) => {
                    warn!(
                        stage,
                        provider = %provider,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying once"
                    );
                    self.logger.log(GenerationEvent::new(
                        "rate_limited",
                        json!({
                            "stage": stage,
                            "chapter": index,
                            "provider": provider.as_str(),
                            "delay_ms": delay.as_millis() as u64,
                        }),
                    ));
                    progress.on_rate_limited(delay);
                    tokio::time::sleep(delay).await;
                    self.call_once(prompt, options).await
                }
                None => Err(error),
            },
            ok => ok,
        };

        match &result {
            Ok(generated) => self.logger.log(GenerationEvent::new(
                "generation_response",
                json!({
                    "stage": stage,
                    "chapter": index,
                    "provider": provider.as_str(),
                    "response_bytes": generated.text.len(),
                    "usage": generated.usage,
                }),
            )),
            Err(error) => warn!(
                stage,
                provider = %provider,
                kind = %error.kind(),
                "Generation request failed: {}",
                error
            ),
        }
        result
    }

    pub(super) fn log_failure(&self, stage: &'static str, index: Option<u32>, error: &GenerateBookError) {
        self.logger.log(GenerationEvent::new(
            "generation_failed",
            json!({
                "stage": stage,
                "chapter": index,
                "kind": error.kind(),
                "message": error.to_string(),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<(&'static str, Value)>>,
    }

    impl GenerationLogger for RecordingLogger {
        fn log(&self, event: GenerationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    #[tokio::test]
    async fn test_request_event_records_prompt_bytes() {
        let gateway = ScriptedGateway::new(vec![Ok("Snow fell on the fjord.".into())]);
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(gateway.clone()).with_logger(logger.clone());
        let mut spec = spec(3);
        spec.title = "Ångström Fjord, Tromsø".to_string();
        let mut session = session_for(spec);

        use_case.generate_chapter(&mut session, 1).await.unwrap();

        let prompt = &gateway.prompts()[0];
        assert_ne!(prompt.len(), prompt.chars().count());
        let events = logger.events.lock().unwrap();
        let (_, request) = events
            .iter()
            .find(|(kind, _)| *kind == "generation_request")
            .unwrap();
        assert_eq!(request["prompt_bytes"], prompt.len());
        assert!(request.get("prompt_chars").is_none());
    }
}
