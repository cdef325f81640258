//! Domain layer for bookwright
//!
//! This crate contains the core entities and pure logic of book generation.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Book Specification**: what the user wants written (title, genre,
//!   audience, length, theme, chapter count, tone)
//! - **Outline**: the per-chapter plan produced by one provider call
//! - **Generation Session**: the mutable state of one book in progress
//! - **Continuity context**: condensed earlier chapters injected into the
//!   next chapter's prompt

pub mod book;
pub mod continuity;
pub mod core;
pub mod outline;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use book::{BookSpecification, Genre, SpecificationError, Tone};
pub use continuity::{
    ContinuityContext, ContinuityTracker, DEFAULT_SUMMARY_FALLBACK_CHARS, PredecessorPolicy,
    PriorChapterDigest,
};
pub use core::error::GenerationErrorKind;
pub use outline::{
    ChapterPlan, Outline, OutlineError, ParsedOutline, clean_chapter_body, parse_chapter_heading,
    parse_outline,
};
pub use prompt::{BookPromptTemplate, PromptError, PromptLimits};
pub use providers::{
    AnthropicProviderConfig, CredentialSet, GeminiProviderConfig, OpenAiProviderConfig,
    ProviderConfig, ProviderCredential, ProviderKind, SecretToken,
};
pub use session::{Chapter, ChapterStatus, GenerationSession, SessionError};
