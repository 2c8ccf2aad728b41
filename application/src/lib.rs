//! Application layer for member-qa
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PipelineParams, RetryPolicy};
pub use ports::{
    answer_oracle::{AnswerOracle, OracleError},
    message_cache::{CacheError, MessageCache},
    message_source::{MessageSource, SourceError},
    progress::{AskProgressNotifier, NoProgress, PageOrigin},
};
pub use use_cases::answer_question::{AnswerQuestionUseCase, AskError};
pub use use_cases::fetch_pages::{PageStream, PaginatedFetcher, StreamedPage};
pub use use_cases::resolve_members::{NameResolver, Resolution};
pub use use_cases::sync_messages::{SyncMessagesUseCase, SyncReport};
pub use use_cases::validate_answer::AnswerValidator;
