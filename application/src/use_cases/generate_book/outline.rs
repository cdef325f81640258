//! Outline creation.

use super::GenerateBookUseCase;
use super::types::GenerateBookError;
use crate::config::OutlineRegenerationPolicy;
use crate::ports::llm_gateway::{GenerationOptions, LlmGateway};
use crate::ports::progress::{BookProgressNotifier, NoProgress};
use bookwright_domain::{BookPromptTemplate, GenerationSession, Outline, parse_outline};
use tracing::{info, warn};

impl<G: LlmGateway + 'static> GenerateBookUseCase<G> {
    /// Create (or replace) the session's outline.
    pub async fn create_outline(
        &self,
        session: &mut GenerationSession,
    ) -> Result<Outline, GenerateBookError> {
        self.create_outline_with_progress(session, &NoProgress).await
    }

    /// Create the outline with progress callbacks.
    ///
    /// The response must contain exactly `chapter_count` chapters. On a
    /// mismatch the provider is asked once more with a stricter prompt; a
    /// second mismatch fails with `OutlineCountMismatch`. The session is only
    /// touched on success.
    pub async fn create_outline_with_progress(
        &self,
        session: &mut GenerationSession,
        progress: &dyn BookProgressNotifier,
    ) -> Result<Outline, GenerateBookError> {
        let result = self.request_outline(session, progress).await;
        match result {
            Ok(outline) => {
                let outline = session.replace_outline(outline).clone();
                info!(
                    chapters = outline.len(),
                    revision = outline.revision(),
                    "Outline created"
                );
                progress.on_outline_complete(&outline);
                Ok(outline)
            }
            Err(error) => {
                self.log_failure("outline", None, &error);
                progress.on_failure(None, error.kind(), &error.to_string());
                Err(error)
            }
        }
    }

    async fn request_outline(
        &self,
        session: &GenerationSession,
        progress: &dyn BookProgressNotifier,
    ) -> Result<Outline, GenerateBookError> {
        if self.params.outline_policy == OutlineRegenerationPolicy::RefuseWhenChaptersExist
            && session.has_chapters()
        {
            return Err(GenerateBookError::OutlineMismatch {
                existing: session.generated_count(),
            });
        }

        let spec = session.specification();
        let expected = spec.chapter_count;
        let prompt = BookPromptTemplate::outline_prompt(spec)?;
        let credential = session.selected_credential()?;
        let options = GenerationOptions::new(
            credential,
            self.params.outline_max_tokens,
            self.params.temperature,
        )
        .with_system_prompt(BookPromptTemplate::system_prompt());

        info!(
            provider = %credential.provider(),
            chapters = expected,
            "Creating outline"
        );
        progress.on_outline_start(credential.provider(), expected);

        let generated = self
            .call_provider("outline", None, &prompt, &options, progress)
            .await?;
        let mut parsed = parse_outline(&generated.text);

        if parsed.plans.len() != expected as usize {
            warn!(
                expected,
                actual = parsed.plans.len(),
                "Outline chapter count mismatch, re-prompting once"
            );
            let strict = BookPromptTemplate::strict_outline_prompt(spec, parsed.plans.len())?;
            let generated = self
                .call_provider("outline", None, &strict, &options, progress)
                .await?;
            parsed = parse_outline(&generated.text);
            if parsed.plans.len() != expected as usize {
                return Err(GenerateBookError::OutlineCountMismatch {
                    expected,
                    actual: parsed.plans.len(),
                });
            }
        }

        Ok(Outline::new(parsed.synopsis, parsed.plans)?)
    }
}
