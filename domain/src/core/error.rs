//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid message identifier: {0}")]
    InvalidMessageId(String),
}

impl DomainError {
    /// Check if this error came from rejecting the user's question text
    pub fn is_invalid_question(&self) -> bool {
        matches!(self, DomainError::InvalidQuestion(_))
    }
}
