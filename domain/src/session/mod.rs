//! Session domain
//!
//! [`GenerationSession`] holds everything about one book in progress; the
//! orchestrator is the only writer.

mod chapter;
mod entities;

pub use chapter::{Chapter, ChapterStatus};
pub use entities::{GenerationSession, SessionError};
