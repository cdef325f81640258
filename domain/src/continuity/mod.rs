//! Continuity tracking between chapters.
//!
//! Builds the bounded context injected into a chapter prompt: the chapter's
//! own plan plus a condensed digest of every earlier chapter already written.
//! Digests are capped per chapter, so the context grows with the number of
//! chapters and never with the length of their bodies.

use crate::outline::ChapterPlan;
use crate::session::GenerationSession;
use crate::util::condense;
use serde::{Deserialize, Serialize};

/// Default cap on each prior-chapter digest, in characters.
pub const DEFAULT_SUMMARY_FALLBACK_CHARS: usize = 600;

/// What to do when chapter `i - 1` has not been generated yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredecessorPolicy {
    /// Proceed, telling the model the previous chapter is not available.
    #[default]
    Standalone,
    /// Fail with `MissingPredecessor`.
    Refuse,
}

impl PredecessorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredecessorPolicy::Standalone => "standalone",
            PredecessorPolicy::Refuse => "refuse",
        }
    }
}

impl std::str::FromStr for PredecessorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standalone" => Ok(PredecessorPolicy::Standalone),
            "refuse" => Ok(PredecessorPolicy::Refuse),
            other => Err(format!("unknown predecessor policy: {}", other)),
        }
    }
}

/// Condensed view of one already generated chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorChapterDigest {
    pub index: u32,
    pub title: String,
    pub summary: String,
}

/// Context for generating one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContinuityContext {
    /// Plan for the chapter being generated; `None` without an outline.
    pub current_plan: Option<ChapterPlan>,
    /// Digests of generated chapters before this one, in index order.
    pub prior: Vec<PriorChapterDigest>,
    /// Set to `i - 1` when the immediately preceding chapter is missing.
    pub missing_predecessor: Option<u32>,
}

impl ContinuityContext {
    /// True when no outline entry is available for the chapter.
    pub fn is_standalone(&self) -> bool {
        self.current_plan.is_none()
    }

    /// Total characters of the prior-chapter digests.
    pub fn digest_chars(&self) -> usize {
        self.prior
            .iter()
            .map(|d| d.title.chars().count() + d.summary.chars().count())
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContinuityTracker {
    summary_fallback_chars: usize,
}

impl Default for ContinuityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_FALLBACK_CHARS)
    }
}

impl ContinuityTracker {
    pub fn new(summary_fallback_chars: usize) -> Self {
        Self {
            summary_fallback_chars: summary_fallback_chars.max(1),
        }
    }

    pub fn summary_fallback_chars(&self) -> usize {
        self.summary_fallback_chars
    }

    /// Derive the continuity context for chapter `index` (1-based).
    pub fn context_for(&self, session: &GenerationSession, index: u32) -> ContinuityContext {
        let outline = session.outline();
        let current_plan = outline.and_then(|o| o.plan(index)).cloned();

        let prior = session
            .chapters()
            .take_while(|c| c.index < index)
            .map(|chapter| {
                let planned = outline
                    .and_then(|o| o.plan(chapter.index))
                    .map(|p| p.summary.trim())
                    .filter(|s| !s.is_empty());
                let source = planned.unwrap_or(&chapter.body);
                PriorChapterDigest {
                    index: chapter.index,
                    title: condense(&chapter.title, self.summary_fallback_chars),
                    summary: condense(source, self.summary_fallback_chars),
                }
            })
            .collect();

        let missing_predecessor = index
            .checked_sub(1)
            .filter(|&prev| prev >= 1 && session.chapter(prev).is_none());

        ContinuityContext {
            current_plan,
            prior,
            missing_predecessor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BookSpecification, Genre, Tone};
    use crate::outline::Outline;
    use crate::providers::{CredentialSet, ProviderCredential, ProviderKind};
    use crate::session::Chapter;

    fn session(chapter_count: u32) -> GenerationSession {
        let spec = BookSpecification::new(
            "The Quiet Harbor",
            Genre::Mystery,
            "Adults",
            50_000,
            "Secrets",
            chapter_count,
            Tone::Dark,
        );
        let credentials =
            CredentialSet::new().with(ProviderCredential::new(ProviderKind::OpenAi, "sk-test"));
        GenerationSession::new(spec, credentials, ProviderKind::OpenAi).unwrap()
    }

    fn store(session: &mut GenerationSession, index: u32, body: &str) {
        session.store_chapter(Chapter::new(
            index,
            format!("Chapter {}", index),
            body,
            ProviderKind::OpenAi,
            None,
        ));
    }

    #[test]
    fn test_first_chapter_has_no_predecessor() {
        let ctx = ContinuityTracker::default().context_for(&session(5), 1);
        assert!(ctx.prior.is_empty());
        assert_eq!(ctx.missing_predecessor, None);
        assert!(ctx.is_standalone());
    }

    #[test]
    fn test_missing_predecessor_detected() {
        let mut session = session(5);
        store(&mut session, 1, "Mara arrives.");
        let ctx = ContinuityTracker::default().context_for(&session, 3);
        assert_eq!(ctx.missing_predecessor, Some(2));
        assert_eq!(ctx.prior.len(), 1);
        assert_eq!(ctx.prior[0].index, 1);
    }

    #[test]
    fn test_uses_outline_summary_when_available() {
        let mut session = session(3);
        let plans = vec![
            ChapterPlan::new(1, "Arrival", "Mara returns home."),
            ChapterPlan::new(2, "Storm", "A storm cuts the town off."),
            ChapterPlan::new(3, "Reveal", "The truth surfaces."),
        ];
        session.replace_outline(Outline::new(None, plans).unwrap());
        store(&mut session, 1, "A very long body that should not be used.");

        let ctx = ContinuityTracker::default().context_for(&session, 2);
        assert_eq!(ctx.prior[0].summary, "Mara returns home.");
        assert_eq!(ctx.current_plan.as_ref().unwrap().title, "Storm");
        assert!(!ctx.is_standalone());
    }

    #[test]
    fn test_excludes_later_chapters() {
        let mut session = session(5);
        store(&mut session, 1, "one");
        store(&mut session, 2, "two");
        store(&mut session, 4, "four");
        let ctx = ContinuityTracker::default().context_for(&session, 3);
        let indices: Vec<u32> = ctx.prior.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_context_size_independent_of_body_length() {
        let tracker = ContinuityTracker::new(100);

        let mut short = session(10);
        let mut long = session(10);
        for i in 1..10 {
            store(&mut short, i, &"word ".repeat(200));
            store(&mut long, i, &"word ".repeat(50_000));
        }

        let short_ctx = tracker.context_for(&short, 10);
        let long_ctx = tracker.context_for(&long, 10);
        assert_eq!(short_ctx.digest_chars(), long_ctx.digest_chars());
        for digest in &long_ctx.prior {
            assert!(digest.summary.chars().count() <= 100 + 3);
        }
    }
}
