//! Application-level configuration.
//!
//! - [`GenerationParams`]: token budgets, timeouts, pacing and policies
//! - [`RateLimitRetry`]: the single bounded retry for rate-limited calls

pub mod generation_params;
pub mod retry_policy;

pub use generation_params::{GenerationParams, OutlineRegenerationPolicy};
pub use retry_policy::RateLimitRetry;
