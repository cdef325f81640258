//! Rate-limit retry policy.

use crate::ports::llm_gateway::GatewayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry applied to `RateLimited` failures only.
///
/// A rate-limited call is retried exactly once, after the provider's advised
/// delay (capped at `max_delay`) or after `backoff` when no hint was given.
/// Every other failure is surfaced immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRetry {
    /// Delay used when the provider gave no retry hint.
    pub backoff: Duration,
    /// Upper bound on a provider-advised delay.
    pub max_delay: Duration,
}

impl Default for RateLimitRetry {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RateLimitRetry {
    pub fn new(backoff: Duration, max_delay: Duration) -> Self {
        Self { backoff, max_delay }
    }

    /// Delay before the single retry, or `None` if `error` is not retryable.
    pub fn delay_for(&self, error: &GatewayError) -> Option<Duration> {
        match error {
            GatewayError::RateLimited { retry_after, .. } => Some(
                retry_after
                    .map(|advised| advised.min(self.max_delay))
                    .unwrap_or(self.backoff),
            ),
            _ => None,
        }
    }
}
