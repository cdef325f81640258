//! Outline domain
//!
//! The per-chapter plan for a book ([`Outline`], [`ChapterPlan`]) and the
//! parser that extracts it from a provider response.

mod entities;
mod parsing;

pub use entities::{ChapterPlan, Outline, OutlineError};
pub use parsing::{ParsedOutline, clean_chapter_body, parse_chapter_heading, parse_outline};
