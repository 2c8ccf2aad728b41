//! Answer oracle port
//!
//! The language model is reached through exactly two structured
//! operations: choosing the members a question is about, and picking the
//! candidate message that answers it.

use async_trait::async_trait;
use member_qa_domain::{Candidate, OracleVerdict};
use thiserror::Error;

/// Errors that can occur during oracle calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed structured response: {0}")]
    Malformed(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl OracleError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, OracleError::Rejected(_))
    }
}

/// Capability interface to the language model
///
/// Adapters must use enforced structured output, never free-text parsing.
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Choose zero or more of `names` that `question` is about.
    ///
    /// `earlier` holds previous questions of the same conversation, oldest
    /// first, so pronouns can refer back to them.
    async fn select_members(
        &self,
        question: &str,
        earlier: &[String],
        names: &[String],
    ) -> Result<Vec<String>, OracleError>;

    /// Pick the candidate that answers `question`, numbered from 1.
    async fn validate(
        &self,
        question: &str,
        candidates: &[Candidate],
    ) -> Result<OracleVerdict, OracleError>;
}
