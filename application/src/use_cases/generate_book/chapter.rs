//! Single chapter generation.

use super::GenerateBookUseCase;
use super::types::GenerateBookError;
use crate::ports::llm_gateway::{GeneratedText, GenerationOptions, LlmGateway};
use crate::ports::progress::{BookProgressNotifier, NoProgress};
use bookwright_domain::{
    BookPromptTemplate, Chapter, ContinuityContext, GenerationSession, PredecessorPolicy,
    clean_chapter_body, parse_chapter_heading,
};
use tracing::{info, warn};

impl<G: LlmGateway + 'static> GenerateBookUseCase<G> {
    /// Generate (or regenerate) chapter `index`.
    pub async fn generate_chapter(
        &self,
        session: &mut GenerationSession,
        index: u32,
    ) -> Result<Chapter, GenerateBookError> {
        self.generate_chapter_with_progress(session, index, &NoProgress)
            .await
    }

    /// Generate chapter `index` with progress callbacks.
    ///
    /// Out-of-range indices, a refused missing predecessor and over-long
    /// inputs fail before any provider call and leave the chapter status
    /// untouched. Once the request is sent the index is `Generating`, then
    /// `Generated` (chapter overwritten) or `Failed` (previous chapter kept).
    pub async fn generate_chapter_with_progress(
        &self,
        session: &mut GenerationSession,
        index: u32,
        progress: &dyn BookProgressNotifier,
    ) -> Result<Chapter, GenerateBookError> {
        let chapter_count = session.chapter_count();
        if !session.specification().contains_chapter(index) {
            return Err(GenerateBookError::IndexOutOfRange {
                index,
                chapter_count,
            });
        }

        let context = self.tracker.context_for(session, index);
        if let Some(missing) = context.missing_predecessor {
            if self.params.predecessor_policy == PredecessorPolicy::Refuse {
                return Err(GenerateBookError::MissingPredecessor { index, missing });
            }
            warn!(
                chapter = index,
                missing, "Previous chapter not generated, continuing standalone"
            );
        }
        let prompt = BookPromptTemplate::chapter_prompt(session.specification(), index, &context)?;
        let credential = session.selected_credential()?.clone();
        let outline_revision = session.outline().map(|o| o.revision());

        info!(
            chapter = index,
            total = chapter_count,
            provider = %credential.provider(),
            prior_chapters = context.prior.len(),
            "Generating chapter"
        );
        session.mark_generating(index);
        progress.on_chapter_start(index, chapter_count);

        let options = GenerationOptions::new(
            &credential,
            self.params.chapter_max_tokens,
            self.params.temperature,
        )
        .with_system_prompt(BookPromptTemplate::system_prompt());

        let result = self
            .call_provider("chapter", Some(index), &prompt, &options, progress)
            .await
            .map_err(GenerateBookError::from)
            .and_then(|generated| build_chapter(index, &context, &generated))
            .map(|(title, body)| {
                Chapter::new(index, title, body, credential.provider(), outline_revision)
            });

        match result {
            Ok(chapter) => {
                info!(
                    chapter = index,
                    words = chapter.word_count(),
                    "Chapter generated"
                );
                let stored = session.store_chapter(chapter).clone();
                progress.on_chapter_complete(&stored);
                Ok(stored)
            }
            Err(error) => {
                session.mark_failed(index, error.kind());
                self.log_failure("chapter", Some(index), &error);
                progress.on_failure(Some(index), error.kind(), &error.to_string());
                Err(error)
            }
        }
    }
}

/// Title and cleaned body for a generated chapter.
///
/// The planned title wins; without an outline, an echoed `Chapter N: Title`
/// heading is used, falling back to `Chapter N`.
fn build_chapter(
    index: u32,
    context: &ContinuityContext,
    generated: &GeneratedText,
) -> Result<(String, String), GenerateBookError> {
    let body = clean_chapter_body(&generated.text).ok_or(GenerateBookError::EmptyChapter(index))?;
    let title = context
        .current_plan
        .as_ref()
        .map(|plan| plan.title.clone())
        .or_else(|| {
            generated
                .text
                .trim()
                .lines()
                .next()
                .map(|line| line.replace("**", "").trim_start_matches('#').trim().to_string())
                .and_then(|line| parse_chapter_heading(&line))
                .map(|(_, title)| title)
                .filter(|title| !title.is_empty())
        })
        .unwrap_or_else(|| format!("Chapter {}", index));
    Ok((title, body))
}
