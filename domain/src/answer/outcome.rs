//! The result handed back to callers of `ask`.

use super::score::ScoredAnswer;
use crate::message::entities::Message;
use serde::{Deserialize, Serialize};

/// Returned when no message answers the question.
pub const FALLBACK_ANSWER: &str = "I couldn't find the answer in the available messages.";

/// Returned for a blank question.
pub const EMPTY_QUESTION_ANSWER: &str = "Please provide a non-empty question.";

/// `{ answer, message }` payload of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskOutcome {
    pub answer: String,
    /// The supporting message, absent for fallback answers.
    pub message: Option<Message>,
}

impl AskOutcome {
    pub fn not_found() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            message: None,
        }
    }

    pub fn empty_question() -> Self {
        Self {
            answer: EMPTY_QUESTION_ANSWER.to_string(),
            message: None,
        }
    }

    pub fn found(&self) -> bool {
        self.message.is_some()
    }
}

impl From<ScoredAnswer> for AskOutcome {
    fn from(scored: ScoredAnswer) -> Self {
        Self {
            answer: scored.answer.answer_text,
            message: Some(scored.answer.source.message.as_ref().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_payload() {
        let outcome = AskOutcome::not_found();
        assert!(!outcome.found());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["answer"], FALLBACK_ANSWER);
        assert!(json["message"].is_null());
    }

    #[test]
    fn test_empty_question_payload() {
        assert_eq!(AskOutcome::empty_question().answer, EMPTY_QUESTION_ANSWER);
    }
}
