//! Port definitions (interfaces for external adapters)

pub mod generation_logger;
pub mod llm_gateway;
pub mod progress;
