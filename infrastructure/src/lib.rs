//! Infrastructure layer for bookwright
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the provider HTTP adapters behind the LLM gateway,
//! configuration file loading, and the JSONL generation event log.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileGenerationConfig,
    FileOutputConfig, FileOutputFormat, FileProvidersConfig, Severity, api_key_env,
    resolve_credentials,
};
pub use logging::JsonlGenerationLogger;
pub use providers::{
    AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ProviderAdapter, ProviderSetupError,
    RoutingGateway, build_adapters,
};
