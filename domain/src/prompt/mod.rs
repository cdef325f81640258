//! Prompt domain
//!
//! Provider-agnostic prompt text for outline and chapter generation.

mod template;

pub use template::{BookPromptTemplate, PromptError, PromptLimits};
