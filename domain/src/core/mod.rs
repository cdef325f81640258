//! Core domain concepts shared across all subdomains.
//!
//! - [`error::GenerationErrorKind`]: the uniform failure taxonomy

pub mod error;
