//! Uniform error taxonomy shared by every layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of every failure the engine can surface.
///
/// Provider-specific errors are mapped into exactly one of these kinds by the
/// adapters; orchestration-level failures (`MissingPredecessor`,
/// `OutlineMismatch`) are produced by the use case itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    AuthenticationFailed,
    RateLimited,
    Timeout,
    InvalidRequest,
    ProviderUnavailable,
    MalformedResponse,
    MissingPredecessor,
    OutlineMismatch,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::InvalidRequest => "invalid_request",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::MalformedResponse => "malformed_response",
            Self::MissingPredecessor => "missing_predecessor",
            Self::OutlineMismatch => "outline_mismatch",
        }
    }

    /// Whether repeating the same request could succeed.
    ///
    /// Only informs callers (e.g. a "retry chapter" button); the orchestrator
    /// itself retries `RateLimited` exclusively.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::ProviderUnavailable
        )
    }
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
