//! Question value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question about the member messages (Value Object)
///
/// Always holds non-blank, trimmed text. Parsing into name candidates and
/// keywords happens separately in [`QuestionParser`](crate::retrieval::parser::QuestionParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Try to create a new question, rejecting blank input
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question text is empty".to_string(),
            ));
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::try_new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation_trims() {
        let q = Question::try_new("  When is Layla travelling?  ").unwrap();
        assert_eq!(q.content(), "When is Layla travelling?");
    }

    #[test]
    fn test_question_try_from_str() {
        let q: Question = "Who booked the opera?".try_into().unwrap();
        assert_eq!(q.content(), "Who booked the opera?");
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Question::try_new("").is_err());
        assert!(Question::try_new("   \n\t").is_err());
    }

    #[test]
    fn test_empty_question_error_kind() {
        let err = Question::try_new(" ").unwrap_err();
        assert!(err.is_invalid_question());
    }
}
