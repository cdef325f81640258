//! Application layer for bookwright
//!
//! This crate contains the book generation use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{GenerationParams, OutlineRegenerationPolicy, RateLimitRetry};
pub use ports::{
    generation_logger::{GenerationEvent, GenerationLogger, NoGenerationLogger},
    llm_gateway::{GatewayError, GeneratedText, GenerationOptions, LlmGateway, TokenUsage},
    progress::{BookProgressNotifier, NoProgress},
};
pub use use_cases::generate_book::{
    BookStatus, ChapterFailure, FullBookOutcome, GenerateBookError, GenerateBookUseCase,
    SessionHandle,
};
