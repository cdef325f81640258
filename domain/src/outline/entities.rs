//! Outline entities.

use crate::core::error::GenerationErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    #[error("Outline has no chapters")]
    Empty,

    #[error("Outline chapter indices are not contiguous: expected {expected}, found {found}")]
    NonContiguous { expected: u32, found: u32 },
}

impl OutlineError {
    pub fn kind(&self) -> GenerationErrorKind {
        GenerationErrorKind::MalformedResponse
    }
}

/// Plan for a single chapter within an [`Outline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPlan {
    /// 1-based chapter index.
    pub index: u32,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl ChapterPlan {
    pub fn new(index: u32, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            summary: summary.into(),
            key_points: Vec::new(),
        }
    }

    pub fn with_key_points(mut self, points: Vec<String>) -> Self {
        self.key_points = points;
        self
    }
}

/// Ordered per-chapter plan for the whole book.
///
/// Chapter indices are always `1..=len()`, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    chapters: Vec<ChapterPlan>,
    /// Assigned by the session when the outline is installed; 0 until then.
    #[serde(default)]
    revision: u32,
}

impl Outline {
    /// Build an outline, sorting plans by index and checking contiguity.
    pub fn new(synopsis: Option<String>, mut chapters: Vec<ChapterPlan>) -> Result<Self, OutlineError> {
        if chapters.is_empty() {
            return Err(OutlineError::Empty);
        }
        chapters.sort_by_key(|c| c.index);
        for (position, plan) in chapters.iter().enumerate() {
            let expected = position as u32 + 1;
            if plan.index != expected {
                return Err(OutlineError::NonContiguous {
                    expected,
                    found: plan.index,
                });
            }
        }
        Ok(Self {
            synopsis,
            chapters,
            revision: 0,
        })
    }

    pub fn chapters(&self) -> &[ChapterPlan] {
        &self.chapters
    }

    pub fn plan(&self, index: u32) -> Option<&ChapterPlan> {
        index
            .checked_sub(1)
            .and_then(|i| self.chapters.get(i as usize))
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }
}
