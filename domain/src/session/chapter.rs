//! Generated chapter entity and its per-index status.

use crate::core::error::GenerationErrorKind;
use crate::providers::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated chapter, keyed by its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub index: u32,
    pub title: String,
    pub body: String,
    pub generated_at: DateTime<Utc>,
    /// Provider that produced the body.
    pub provider: ProviderKind,
    /// Revision of the outline this chapter was written against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_revision: Option<u32>,
}

impl Chapter {
    pub fn new(
        index: u32,
        title: impl Into<String>,
        body: impl Into<String>,
        provider: ProviderKind,
        outline_revision: Option<u32>,
    ) -> Self {
        Self {
            index,
            title: title.into(),
            body: body.into(),
            generated_at: Utc::now(),
            provider,
            outline_revision,
        }
    }

    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

/// Lifecycle of a single chapter index within a session.
///
/// `NotStarted -> Generating -> (Generated | Failed)`. Both `Generated` and
/// `Failed` go back to `Generating` when the chapter is requested again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChapterStatus {
    #[default]
    NotStarted,
    Generating,
    Generated,
    Failed {
        kind: GenerationErrorKind,
    },
}

impl ChapterStatus {
    pub fn is_generated(&self) -> bool {
        matches!(self, ChapterStatus::Generated)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ChapterStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        let chapter = Chapter::new(1, "Dawn", "The tide  came in\nslowly.", ProviderKind::OpenAi, None);
        assert_eq!(chapter.word_count(), 5);
    }

    #[test]
    fn test_status_serialization() {
        let failed = ChapterStatus::Failed {
            kind: GenerationErrorKind::Timeout,
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"state":"failed","kind":"timeout"}"#);
        assert_eq!(
            serde_json::to_string(&ChapterStatus::NotStarted).unwrap(),
            r#"{"state":"not_started"}"#
        );
    }

    #[test]
    fn test_chapter_serializes_without_missing_revision() {
        let chapter = Chapter::new(2, "Tide", "Body", ProviderKind::Gemini, None);
        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["provider"], "gemini");
        assert!(json.get("outline_revision").is_none());
    }
}
