//! Port for structured generation event logging.
//!
//! Defines the [`GenerationLogger`] trait for recording generation events
//! (outline and chapter requests, responses, retries, failures) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable record (JSONL) of what was asked of which provider.
//! Events carry sizes and counts, never prompt text or credentials.

use serde_json::Value;

/// A structured generation event for logging.
pub struct GenerationEvent {
    /// Event type identifier (e.g., "outline_request", "chapter_response").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl GenerationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging generation events to a structured log.
///
/// `log` is synchronous and non-fallible; logging failures never disturb a
/// generation run.
pub trait GenerationLogger: Send + Sync {
    fn log(&self, event: GenerationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoGenerationLogger;

impl GenerationLogger for NoGenerationLogger {
    fn log(&self, _event: GenerationEvent) {}
}
