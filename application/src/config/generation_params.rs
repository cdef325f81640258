//! Generation parameters: use case control.
//!
//! [`GenerationParams`] groups the static parameters that control
//! [`GenerateBookUseCase`](crate::use_cases::generate_book::GenerateBookUseCase):
//! token budgets, sampling temperature, timeouts, pacing and policies.

use super::retry_policy::RateLimitRetry;
use bookwright_domain::{DEFAULT_SUMMARY_FALLBACK_CHARS, PredecessorPolicy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// What `create_outline` does when chapters already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineRegenerationPolicy {
    /// Replace the outline; existing chapters are kept and reported by
    /// `GenerationSession::stale_chapters`.
    #[default]
    KeepChapters,
    /// Fail with `OutlineMismatch` before any provider call.
    RefuseWhenChaptersExist,
}

impl OutlineRegenerationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlineRegenerationPolicy::KeepChapters => "keep_chapters",
            OutlineRegenerationPolicy::RefuseWhenChaptersExist => "refuse_when_chapters_exist",
        }
    }
}

impl FromStr for OutlineRegenerationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "keep_chapters" | "keep" => Ok(OutlineRegenerationPolicy::KeepChapters),
            "refuse_when_chapters_exist" | "refuse" => {
                Ok(OutlineRegenerationPolicy::RefuseWhenChaptersExist)
            }
            other => Err(format!("unknown outline policy: {}", other)),
        }
    }
}

/// Use case control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Requested `max_tokens` for the outline call.
    pub outline_max_tokens: u32,
    /// Requested `max_tokens` for each chapter call.
    pub chapter_max_tokens: u32,
    pub temperature: f32,
    /// Bound on each individual provider call.
    pub provider_timeout: Duration,
    /// Pause between consecutive chapters of a full-book run.
    pub chapter_pacing: Duration,
    /// Cap on each prior-chapter digest in the continuity context.
    pub summary_fallback_chars: usize,
    pub predecessor_policy: PredecessorPolicy,
    pub outline_policy: OutlineRegenerationPolicy,
    pub rate_limit: RateLimitRetry,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            outline_max_tokens: 4000,
            chapter_max_tokens: 3000,
            temperature: 0.7,
            provider_timeout: Duration::from_secs(120),
            chapter_pacing: Duration::from_secs(1),
            summary_fallback_chars: DEFAULT_SUMMARY_FALLBACK_CHARS,
            predecessor_policy: PredecessorPolicy::default(),
            outline_policy: OutlineRegenerationPolicy::default(),
            rate_limit: RateLimitRetry::default(),
        }
    }
}

impl GenerationParams {
    // ==================== Builder Methods ====================

    pub fn with_outline_max_tokens(mut self, max: u32) -> Self {
        self.outline_max_tokens = max;
        self
    }

    pub fn with_chapter_max_tokens(mut self, max: u32) -> Self {
        self.chapter_max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_chapter_pacing(mut self, pacing: Duration) -> Self {
        self.chapter_pacing = pacing;
        self
    }

    pub fn with_summary_fallback_chars(mut self, chars: usize) -> Self {
        self.summary_fallback_chars = chars;
        self
    }

    pub fn with_predecessor_policy(mut self, policy: PredecessorPolicy) -> Self {
        self.predecessor_policy = policy;
        self
    }

    pub fn with_outline_policy(mut self, policy: OutlineRegenerationPolicy) -> Self {
        self.outline_policy = policy;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitRetry) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}
