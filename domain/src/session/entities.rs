//! Generation session - the mutable state of one in-progress book.

use super::chapter::{Chapter, ChapterStatus};
use crate::book::{BookSpecification, SpecificationError};
use crate::core::error::GenerationErrorKind;
use crate::outline::Outline;
use crate::providers::{CredentialSet, ProviderCredential, ProviderKind};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid book specification: {0}")]
    InvalidSpecification(#[from] SpecificationError),

    #[error("No provider credentials configured")]
    NoCredentials,

    #[error("No credential configured for provider {0}")]
    MissingCredential(ProviderKind),
}

impl SessionError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            SessionError::InvalidSpecification(_) => GenerationErrorKind::InvalidRequest,
            SessionError::NoCredentials | SessionError::MissingCredential(_) => {
                GenerationErrorKind::AuthenticationFailed
            }
        }
    }
}

/// State of one book being generated.
///
/// Owns the specification (read-only after creation), at most one outline,
/// the chapters generated so far and their per-index status, and the
/// credentials the session may use. Mutations go through methods that
/// replace an outline or chapter whole; nothing is ever partially written.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    specification: BookSpecification,
    outline: Option<Outline>,
    chapters: BTreeMap<u32, Chapter>,
    statuses: BTreeMap<u32, ChapterStatus>,
    credentials: CredentialSet,
    selected: ProviderKind,
    outline_revisions: u32,
}

impl GenerationSession {
    /// Start a session. Fails if the specification is invalid, no credential
    /// is configured, or the selected provider has none.
    pub fn new(
        specification: BookSpecification,
        credentials: CredentialSet,
        selected: ProviderKind,
    ) -> Result<Self, SessionError> {
        specification.validate()?;
        if credentials.is_empty() {
            return Err(SessionError::NoCredentials);
        }
        if !credentials.contains(selected) {
            return Err(SessionError::MissingCredential(selected));
        }
        Ok(Self {
            specification,
            outline: None,
            chapters: BTreeMap::new(),
            statuses: BTreeMap::new(),
            credentials,
            selected,
            outline_revisions: 0,
        })
    }

    pub fn specification(&self) -> &BookSpecification {
        &self.specification
    }

    pub fn chapter_count(&self) -> u32 {
        self.specification.chapter_count
    }

    pub fn selected_provider(&self) -> ProviderKind {
        self.selected
    }

    /// Switch provider for subsequent calls.
    pub fn select_provider(&mut self, provider: ProviderKind) -> Result<(), SessionError> {
        if !self.credentials.contains(provider) {
            return Err(SessionError::MissingCredential(provider));
        }
        self.selected = provider;
        Ok(())
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn selected_credential(&self) -> Result<&ProviderCredential, SessionError> {
        self.credentials
            .get(self.selected)
            .ok_or(SessionError::MissingCredential(self.selected))
    }

    // ==================== Outline ====================

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    /// Install a new outline, replacing any previous one, and stamp it with
    /// the next revision number. Existing chapters are kept.
    pub fn replace_outline(&mut self, mut outline: Outline) -> &Outline {
        self.outline_revisions += 1;
        outline.set_revision(self.outline_revisions);
        self.outline.insert(outline)
    }

    // ==================== Chapters ====================

    pub fn chapter(&self, index: u32) -> Option<&Chapter> {
        self.chapters.get(&index)
    }

    /// Generated chapters in index order.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.values()
    }

    pub fn generated_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }

    pub fn status(&self, index: u32) -> ChapterStatus {
        self.statuses.get(&index).copied().unwrap_or_default()
    }

    pub fn mark_generating(&mut self, index: u32) {
        self.statuses.insert(index, ChapterStatus::Generating);
    }

    /// Record a failed attempt. A previously generated chapter for the same
    /// index is left in place.
    pub fn mark_failed(&mut self, index: u32, kind: GenerationErrorKind) {
        self.statuses.insert(index, ChapterStatus::Failed { kind });
    }

    /// Store a chapter, overwriting any previous one at the same index.
    pub fn store_chapter(&mut self, chapter: Chapter) -> &Chapter {
        let index = chapter.index;
        self.statuses.insert(index, ChapterStatus::Generated);
        self.chapters.insert(index, chapter);
        &self.chapters[&index]
    }

    /// Indices within `1..=chapter_count` with no generated chapter.
    pub fn missing_chapters(&self) -> Vec<u32> {
        (1..=self.chapter_count())
            .filter(|i| !self.chapters.contains_key(i))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_chapters().is_empty()
    }

    /// Chapters written against an older outline revision, or without an
    /// outline while one now exists.
    pub fn stale_chapters(&self) -> Vec<u32> {
        let Some(current) = self.outline.as_ref().map(Outline::revision) else {
            return Vec::new();
        };
        self.chapters
            .values()
            .filter(|c| c.outline_revision != Some(current))
            .map(|c| c.index)
            .collect()
    }
}
