//! Domain layer for member-qa
//!
//! This crate contains the core types and rules of the question-answering
//! pipeline. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Message**: an immutable chat message fetched from the upstream source
//! - **Candidate**: a message that survived lexical filtering and may be
//!   shown to the oracle
//! - **Grounding**: every answer is a fragment of the message it cites
//! - **Best answer**: the strictly best-scoring grounded answer of a request

pub mod answer;
pub mod config;
pub mod core;
pub mod message;
pub mod prompt;
pub mod retrieval;
pub mod util;

// Re-export commonly used types
pub use answer::{
    outcome::{AskOutcome, EMPTY_QUESTION_ANSWER, FALLBACK_ANSWER},
    score::{AnswerScore, BestAnswer, ScoredAnswer},
    verdict::{GroundedAnswer, OracleVerdict, ValidationResult, ground, is_grounded},
};
pub use config::OutputFormat;
pub use core::{error::DomainError, question::Question};
pub use message::{
    entities::{Message, MessageId, MessageKey},
    page::{MessagePage, PageCursor},
};
pub use prompt::PromptTemplate;
pub use retrieval::{
    filter::{Candidate, count_keyword_matches, filter_candidates},
    members::{MemberRoster, ResolvedMembers, names_match},
    parser::{ParsedQuestion, QuestionParser},
};
