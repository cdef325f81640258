//! Error and result types for the GenerateBook use case.

use crate::ports::llm_gateway::GatewayError;
use bookwright_domain::{
    Chapter, GenerationErrorKind, GenerationSession, Outline, OutlineError, PromptError,
    SessionError,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during outline or chapter generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateBookError {
    #[error("Invalid prompt input: {0}")]
    Prompt(#[from] PromptError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Chapter {index} is out of range (book has {chapter_count} chapters)")]
    IndexOutOfRange { index: u32, chapter_count: u32 },

    #[error("Outline has {actual} chapters after a strict re-prompt, expected {expected}")]
    OutlineCountMismatch { expected: u32, actual: usize },

    #[error("Invalid outline: {0}")]
    InvalidOutline(#[from] OutlineError),

    #[error("Provider returned an empty body for chapter {0}")]
    EmptyChapter(u32),

    #[error("Chapter {index} requires chapter {missing} to be generated first")]
    MissingPredecessor { index: u32, missing: u32 },

    #[error("Outline cannot be replaced while {existing} chapters exist")]
    OutlineMismatch { existing: usize },

    #[error("Session is busy with another operation")]
    SessionBusy,
}

impl GenerateBookError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerateBookError::Prompt(e) => e.kind(),
            GenerateBookError::Session(e) => e.kind(),
            GenerateBookError::GatewayError(e) => e.kind(),
            GenerateBookError::IndexOutOfRange { .. } | GenerateBookError::SessionBusy => {
                GenerationErrorKind::InvalidRequest
            }
            GenerateBookError::OutlineCountMismatch { .. }
            | GenerateBookError::EmptyChapter(_) => GenerationErrorKind::MalformedResponse,
            GenerateBookError::InvalidOutline(e) => e.kind(),
            GenerateBookError::MissingPredecessor { .. } => GenerationErrorKind::MissingPredecessor,
            GenerateBookError::OutlineMismatch { .. } => GenerationErrorKind::OutlineMismatch,
        }
    }
}

/// Failure that stopped a full-book run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFailure {
    /// Failing chapter; `None` when the outline stage failed.
    pub index: Option<u32>,
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl ChapterFailure {
    pub fn new(index: Option<u32>, error: &GenerateBookError) -> Self {
        Self {
            index,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Coarse result of a full-book run, for callers deciding what to offer next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookStatus {
    /// Every chapter was generated.
    Complete,
    /// The run failed before any chapter existed.
    NothingGenerated,
    /// Some chapters exist; the run stopped at `failed_at` (`None`: outline stage).
    Partial { failed_at: Option<u32> },
    /// Stopped by cancellation; completed chapters are kept.
    Cancelled,
}

/// Result of `generate_full_book`: whatever was produced, plus the failure
/// that stopped the run, if any.
#[derive(Debug, Clone, Serialize)]
pub struct FullBookOutcome {
    pub outline: Option<Outline>,
    pub chapters: Vec<Chapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ChapterFailure>,
    pub cancelled: bool,
}

impl FullBookOutcome {
    pub(crate) fn from_session(
        session: &GenerationSession,
        failure: Option<ChapterFailure>,
        cancelled: bool,
    ) -> Self {
        Self {
            outline: session.outline().cloned(),
            chapters: session.chapters().cloned().collect(),
            failure,
            cancelled,
        }
    }

    pub fn status(&self) -> BookStatus {
        if self.cancelled {
            return BookStatus::Cancelled;
        }
        match &self.failure {
            None => BookStatus::Complete,
            Some(_) if self.chapters.is_empty() => BookStatus::NothingGenerated,
            Some(failure) => BookStatus::Partial {
                failed_at: failure.index,
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == BookStatus::Complete
    }

    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(Chapter::word_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookwright_domain::ProviderKind;

    fn outcome(chapters: u32, failure: Option<ChapterFailure>, cancelled: bool) -> FullBookOutcome {
        FullBookOutcome {
            outline: None,
            chapters: (1..=chapters)
                .map(|i| Chapter::new(i, "T", "one two three", ProviderKind::OpenAi, None))
                .collect(),
            failure,
            cancelled,
        }
    }

    fn failure(index: Option<u32>) -> ChapterFailure {
        ChapterFailure::new(
            index,
            &GenerateBookError::GatewayError(GatewayError::ProviderUnavailable("503".into())),
        )
    }

    #[test]
    fn test_status_variants() {
        assert_eq!(outcome(3, None, false).status(), BookStatus::Complete);
        assert_eq!(
            outcome(0, Some(failure(None)), false).status(),
            BookStatus::NothingGenerated
        );
        assert_eq!(
            outcome(2, Some(failure(Some(3))), false).status(),
            BookStatus::Partial { failed_at: Some(3) }
        );
        assert_eq!(outcome(1, None, true).status(), BookStatus::Cancelled);
    }

    #[test]
    fn test_failure_carries_kind_and_message() {
        let failure = failure(Some(3));
        assert_eq!(failure.kind, GenerationErrorKind::ProviderUnavailable);
        assert!(failure.message.contains("503"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GenerateBookError::IndexOutOfRange {
                index: 7,
                chapter_count: 5
            }
            .kind(),
            GenerationErrorKind::InvalidRequest
        );
        assert_eq!(
            GenerateBookError::OutlineCountMismatch {
                expected: 5,
                actual: 4
            }
            .kind(),
            GenerationErrorKind::MalformedResponse
        );
        assert_eq!(
            GenerateBookError::MissingPredecessor {
                index: 3,
                missing: 2
            }
            .kind(),
            GenerationErrorKind::MissingPredecessor
        );
        assert_eq!(
            GenerateBookError::OutlineMismatch { existing: 2 }.kind(),
            GenerationErrorKind::OutlineMismatch
        );
    }

    #[test]
    fn test_total_words() {
        assert_eq!(outcome(2, None, false).total_words(), 6);
    }
}
