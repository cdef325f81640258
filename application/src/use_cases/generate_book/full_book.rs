//! Full book generation.

use super::GenerateBookUseCase;
use super::types::{ChapterFailure, FullBookOutcome};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{BookProgressNotifier, NoProgress};
use bookwright_domain::GenerationSession;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

impl<G: LlmGateway + 'static> GenerateBookUseCase<G> {
    /// Generate the outline (if absent) and then every chapter in order.
    pub async fn generate_full_book(
        &self,
        session: &mut GenerationSession,
        cancel: &CancellationToken,
    ) -> FullBookOutcome {
        self.generate_full_book_with_progress(session, cancel, &NoProgress)
            .await
    }

    /// Generate the whole book with progress callbacks.
    ///
    /// Chapters run strictly one after another, since each prompt depends on
    /// the chapters before it. The run stops at the first failure; chapters
    /// already generated stay in the session and in the outcome.
    /// Cancellation is checked before each chapter and interrupts the pacing
    /// pause between chapters.
    pub async fn generate_full_book_with_progress(
        &self,
        session: &mut GenerationSession,
        cancel: &CancellationToken,
        progress: &dyn BookProgressNotifier,
    ) -> FullBookOutcome {
        let total = session.chapter_count();
        info!(
            title = %session.specification().title,
            chapters = total,
            provider = %session.selected_provider(),
            "Starting full book generation"
        );

        if session.outline().is_none() {
            if cancel.is_cancelled() {
                return self.cancelled(session, progress);
            }
            if let Err(error) = self.create_outline_with_progress(session, progress).await {
                return FullBookOutcome::from_session(
                    session,
                    Some(ChapterFailure::new(None, &error)),
                    false,
                );
            }
        }

        for index in 1..=total {
            if index > 1 && !self.params.chapter_pacing.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.params.chapter_pacing) => {}
                }
            }
            if cancel.is_cancelled() {
                return self.cancelled(session, progress);
            }

            if let Err(error) = self
                .generate_chapter_with_progress(session, index, progress)
                .await
            {
                warn!(
                    chapter = index,
                    kind = %error.kind(),
                    "Stopping full book generation"
                );
                return FullBookOutcome::from_session(
                    session,
                    Some(ChapterFailure::new(Some(index), &error)),
                    false,
                );
            }
        }

        info!(chapters = total, "Full book generated");
        FullBookOutcome::from_session(session, None, false)
    }

    fn cancelled(
        &self,
        session: &GenerationSession,
        progress: &dyn BookProgressNotifier,
    ) -> FullBookOutcome {
        info!(
            completed = session.generated_count(),
            "Full book generation cancelled"
        );
        progress.on_cancelled(session.generated_count());
        FullBookOutcome::from_session(session, None, true)
    }
}
