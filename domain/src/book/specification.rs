//! Book specification - the user-supplied description of the desired book.

use super::genre::{Genre, Tone};
use crate::core::error::GenerationErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed chapter counts.
pub const CHAPTER_COUNT_RANGE: std::ops::RangeInclusive<u32> = 3..=50;
/// Allowed total word counts.
pub const TARGET_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 1_000..=500_000;
/// Allowed explicit words-per-chapter targets.
pub const WORDS_PER_CHAPTER_RANGE: std::ops::RangeInclusive<u32> = 200..=20_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecificationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Theme must not be empty")]
    EmptyTheme,

    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Chapter count {0} is outside the allowed range 3..=50")]
    ChapterCountOutOfRange(u32),

    #[error("Target length {0} words is outside the allowed range 1000..=500000")]
    TargetLengthOutOfRange(u32),

    #[error("Words per chapter {0} is outside the allowed range 200..=20000")]
    WordsPerChapterOutOfRange(u32),
}

impl SpecificationError {
    pub fn kind(&self) -> GenerationErrorKind {
        GenerationErrorKind::InvalidRequest
    }
}

/// Parameters describing the book to generate.
///
/// Created from user input before any generation call. Once handed to a
/// [`GenerationSession`](crate::session::GenerationSession) it is only
/// reachable through a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSpecification {
    pub title: String,
    pub genre: Genre,
    pub target_audience: String,
    /// Approximate total length in words.
    pub target_length: u32,
    pub theme: String,
    pub chapter_count: u32,
    #[serde(default)]
    pub tone: Tone,
    /// Free-form extra guidance (characters, setting, constraints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    /// Explicit per-chapter word target; derived from `target_length` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words_per_chapter: Option<u32>,
}

impl BookSpecification {
    pub fn new(
        title: impl Into<String>,
        genre: Genre,
        target_audience: impl Into<String>,
        target_length: u32,
        theme: impl Into<String>,
        chapter_count: u32,
        tone: Tone,
    ) -> Self {
        Self {
            title: title.into(),
            genre,
            target_audience: target_audience.into(),
            target_length,
            theme: theme.into(),
            chapter_count,
            tone,
            additional_details: None,
            words_per_chapter: None,
        }
    }

    pub fn with_additional_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.additional_details = if details.trim().is_empty() {
            None
        } else {
            Some(details)
        };
        self
    }

    pub fn with_words_per_chapter(mut self, words: u32) -> Self {
        self.words_per_chapter = Some(words);
        self
    }

    /// Check the numeric bounds and required fields.
    ///
    /// Text length limits are enforced by the prompt builder, which owns the
    /// documented maxima.
    pub fn validate(&self) -> Result<(), SpecificationError> {
        if self.title.trim().is_empty() {
            return Err(SpecificationError::EmptyTitle);
        }
        if self.theme.trim().is_empty() {
            return Err(SpecificationError::EmptyTheme);
        }
        if !CHAPTER_COUNT_RANGE.contains(&self.chapter_count) {
            return Err(SpecificationError::ChapterCountOutOfRange(
                self.chapter_count,
            ));
        }
        if !TARGET_LENGTH_RANGE.contains(&self.target_length) {
            return Err(SpecificationError::TargetLengthOutOfRange(
                self.target_length,
            ));
        }
        if let Some(words) = self.words_per_chapter
            && !WORDS_PER_CHAPTER_RANGE.contains(&words)
        {
            return Err(SpecificationError::WordsPerChapterOutOfRange(words));
        }
        Ok(())
    }

    /// Word target for a single chapter.
    pub fn chapter_word_target(&self) -> u32 {
        self.words_per_chapter
            .unwrap_or_else(|| self.target_length / self.chapter_count.max(1))
    }

    /// Whether `index` is a valid 1-based chapter index for this book.
    pub fn contains_chapter(&self, index: u32) -> bool {
        (1..=self.chapter_count).contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mystery() -> BookSpecification {
        BookSpecification::new(
            "The Quiet Harbor",
            Genre::Mystery,
            "Adults",
            50_000,
            "Secrets of a fishing town",
            5,
            Tone::Dark,
        )
    }

    #[test]
    fn test_valid_specification() {
        assert!(mystery().validate().is_ok());
    }

    #[test]
    fn test_chapter_count_bounds() {
        let mut spec = mystery();
        spec.chapter_count = 2;
        assert_eq!(
            spec.validate(),
            Err(SpecificationError::ChapterCountOutOfRange(2))
        );
        spec.chapter_count = 51;
        assert!(spec.validate().is_err());
        spec.chapter_count = 50;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_target_length_bounds() {
        let mut spec = mystery();
        spec.target_length = 999;
        assert_eq!(
            spec.validate(),
            Err(SpecificationError::TargetLengthOutOfRange(999))
        );
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut spec = mystery();
        spec.title = "   ".to_string();
        assert_eq!(spec.validate(), Err(SpecificationError::EmptyTitle));
    }

    #[test]
    fn test_chapter_word_target() {
        assert_eq!(mystery().chapter_word_target(), 10_000);
        assert_eq!(mystery().with_words_per_chapter(2_000).chapter_word_target(), 2_000);
    }

    #[test]
    fn test_blank_details_are_dropped() {
        let spec = mystery().with_additional_details("  ");
        assert!(spec.additional_details.is_none());
    }

    #[test]
    fn test_contains_chapter() {
        let spec = mystery();
        assert!(spec.contains_chapter(1));
        assert!(spec.contains_chapter(5));
        assert!(!spec.contains_chapter(0));
        assert!(!spec.contains_chapter(7));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "title": "T",
            "genre": "science-fiction",
            "target_audience": "Teens",
            "target_length": 30000,
            "theme": "First contact",
            "chapter_count": 10
        }"#;
        let spec: BookSpecification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.genre, Genre::ScienceFiction);
        assert_eq!(spec.tone, Tone::Engaging);
        assert!(spec.additional_details.is_none());
    }
}
