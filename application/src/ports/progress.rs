//! Progress notification port
//!
//! Defines the interface for reporting progress while a book is generated.

use bookwright_domain::{Chapter, GenerationErrorKind, Outline, ProviderKind};
use std::time::Duration;

/// Callback for progress updates during book generation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait BookProgressNotifier: Send + Sync {
    /// Called before the outline request is sent
    fn on_outline_start(&self, provider: ProviderKind, chapter_count: u32);

    /// Called once an outline has been installed in the session
    fn on_outline_complete(&self, outline: &Outline);

    /// Called before a chapter request is sent
    fn on_chapter_start(&self, index: u32, total: u32);

    /// Called when a chapter has been stored
    fn on_chapter_complete(&self, chapter: &Chapter);

    /// Called when a chapter (or the outline, with `index == None`) fails
    fn on_failure(&self, _index: Option<u32>, _kind: GenerationErrorKind, _message: &str) {}

    /// Called before sleeping ahead of a rate-limit retry
    fn on_rate_limited(&self, _delay: Duration) {}

    /// Called when a full-book run stops because of cancellation
    fn on_cancelled(&self, _completed: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl BookProgressNotifier for NoProgress {
    fn on_outline_start(&self, _provider: ProviderKind, _chapter_count: u32) {}
    fn on_outline_complete(&self, _outline: &Outline) {}
    fn on_chapter_start(&self, _index: u32, _total: u32) {}
    fn on_chapter_complete(&self, _chapter: &Chapter) {}
}
