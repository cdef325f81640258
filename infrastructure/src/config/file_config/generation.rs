//! Generation configuration from TOML (`[generation]` section)

use crate::config::issue::{ConfigIssue, ConfigIssueCode};
use bookwright_application::{GenerationParams, OutlineRegenerationPolicy, RateLimitRetry};
use bookwright_domain::PredecessorPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw generation configuration from TOML.
///
/// Enum-like fields stay strings here so that a typo produces a warning
/// instead of a load failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub outline_max_tokens: u32,
    pub chapter_max_tokens: u32,
    pub temperature: f32,
    pub provider_timeout_secs: u64,
    pub rate_limit_backoff_secs: u64,
    pub max_rate_limit_delay_secs: u64,
    /// Pause between chapters of a full-book run, in milliseconds.
    pub chapter_pacing_ms: u64,
    pub summary_fallback_chars: usize,
    /// "standalone" or "refuse"
    pub predecessor_policy: String,
    /// "keep_chapters" or "refuse_when_chapters_exist"
    pub outline_policy: String,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let d = GenerationParams::default();
        Self {
            outline_max_tokens: d.outline_max_tokens,
            chapter_max_tokens: d.chapter_max_tokens,
            temperature: d.temperature,
            provider_timeout_secs: d.provider_timeout.as_secs(),
            rate_limit_backoff_secs: d.rate_limit.backoff.as_secs(),
            max_rate_limit_delay_secs: d.rate_limit.max_delay.as_secs(),
            chapter_pacing_ms: d.chapter_pacing.as_millis() as u64,
            summary_fallback_chars: d.summary_fallback_chars,
            predecessor_policy: d.predecessor_policy.as_str().to_string(),
            outline_policy: d.outline_policy.as_str().to_string(),
        }
    }
}

impl FileGenerationConfig {
    /// Convert to [`GenerationParams`], replacing unusable values with
    /// defaults and reporting each replacement.
    pub fn to_generation_params(&self) -> (GenerationParams, Vec<ConfigIssue>) {
        let defaults = GenerationParams::default();
        let mut issues = Vec::new();

        let outline_max_tokens = positive(
            "generation.outline_max_tokens",
            self.outline_max_tokens,
            defaults.outline_max_tokens,
            &mut issues,
        );
        let chapter_max_tokens = positive(
            "generation.chapter_max_tokens",
            self.chapter_max_tokens,
            defaults.chapter_max_tokens,
            &mut issues,
        );
        let provider_timeout_secs = positive(
            "generation.provider_timeout_secs",
            self.provider_timeout_secs,
            defaults.provider_timeout.as_secs(),
            &mut issues,
        );
        let summary_fallback_chars = positive(
            "generation.summary_fallback_chars",
            self.summary_fallback_chars,
            defaults.summary_fallback_chars,
            &mut issues,
        );

        let temperature = if self.temperature.is_finite() && self.temperature >= 0.0 {
            self.temperature
        } else {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "generation.temperature".to_string(),
                    value: self.temperature.to_string(),
                },
                format!(
                    "generation.temperature: {} is not a valid temperature, using {}",
                    self.temperature, defaults.temperature
                ),
            ));
            defaults.temperature
        };

        let predecessor_policy = self
            .predecessor_policy
            .parse::<PredecessorPolicy>()
            .unwrap_or_else(|_| {
                issues.push(ConfigIssue::invalid_enum(
                    "generation.predecessor_policy",
                    &self.predecessor_policy,
                    &["standalone", "refuse"],
                    defaults.predecessor_policy.as_str(),
                ));
                defaults.predecessor_policy
            });

        let outline_policy = self
            .outline_policy
            .parse::<OutlineRegenerationPolicy>()
            .unwrap_or_else(|_| {
                issues.push(ConfigIssue::invalid_enum(
                    "generation.outline_policy",
                    &self.outline_policy,
                    &["keep_chapters", "refuse_when_chapters_exist"],
                    defaults.outline_policy.as_str(),
                ));
                defaults.outline_policy
            });

        let params = GenerationParams {
            outline_max_tokens,
            chapter_max_tokens,
            temperature,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            chapter_pacing: Duration::from_millis(self.chapter_pacing_ms),
            summary_fallback_chars,
            predecessor_policy,
            outline_policy,
            rate_limit: RateLimitRetry::new(
                Duration::from_secs(self.rate_limit_backoff_secs),
                Duration::from_secs(self.max_rate_limit_delay_secs),
            ),
        };
        (params, issues)
    }
}

fn positive<T>(field: &str, value: T, fallback: T, issues: &mut Vec<ConfigIssue>) -> T
where
    T: Copy + Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        issues.push(ConfigIssue::zero(field, fallback));
        fallback
    } else {
        value
    }
}
