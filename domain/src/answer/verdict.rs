//! Oracle verdicts and the grounding invariant.
//!
//! The oracle only ever picks a candidate and quotes it. [`ground`] turns
//! its raw verdict into a [`ValidationResult`] whose answer text is always
//! a fragment of the selected message body.

use crate::retrieval::filter::Candidate;
use crate::util::normalize_text;

/// Raw structured output of an answer validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleVerdict {
    /// None of the candidates answers the question.
    NoAnswer,
    /// An answer, with the 1-based number of the supporting candidate.
    Answer {
        answer_text: String,
        source_number: Option<usize>,
    },
}

impl OracleVerdict {
    pub fn answer(answer_text: impl Into<String>, source_number: usize) -> Self {
        OracleVerdict::Answer {
            answer_text: answer_text.into(),
            source_number: Some(source_number),
        }
    }
}

/// An answer tied to the candidate it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedAnswer {
    pub answer_text: String,
    pub source: Candidate,
    /// The oracle's wording did not appear in the source and was replaced by the full body.
    pub repaired: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    NoAnswer,
    Answer(GroundedAnswer),
}

impl ValidationResult {
    pub fn is_answer(&self) -> bool {
        matches!(self, ValidationResult::Answer(_))
    }
}

/// Whether `answer` appears in `body`, ignoring case, whitespace runs and
/// surrounding quotes.
pub fn is_grounded(answer: &str, body: &str) -> bool {
    let answer = normalize_text(trim_quotes(answer));
    !answer.is_empty() && normalize_text(body).contains(&answer)
}

/// Select the source candidate and enforce grounding.
///
/// Out-of-range source numbers and empty answers become
/// [`ValidationResult::NoAnswer`]. A missing number is accepted only when
/// the batch holds a single candidate.
pub fn ground(verdict: OracleVerdict, batch: &[Candidate]) -> ValidationResult {
    let (answer_text, source_number) = match verdict {
        OracleVerdict::NoAnswer => return ValidationResult::NoAnswer,
        OracleVerdict::Answer {
            answer_text,
            source_number,
        } => (answer_text, source_number),
    };

    let answer_text = answer_text.trim();
    if answer_text.is_empty() {
        return ValidationResult::NoAnswer;
    }

    let source = match (source_number, batch.len()) {
        (Some(n), len) if n >= 1 && n <= len => &batch[n - 1],
        (None, 1) => &batch[0],
        _ => return ValidationResult::NoAnswer,
    };

    let body = source.message.body.trim();
    if body.is_empty() {
        return ValidationResult::NoAnswer;
    }

    if is_grounded(answer_text, body) {
        ValidationResult::Answer(GroundedAnswer {
            answer_text: trim_quotes(answer_text).to_string(),
            source: source.clone(),
            repaired: false,
        })
    } else {
        ValidationResult::Answer(GroundedAnswer {
            answer_text: body.to_string(),
            source: source.clone(),
            repaired: true,
        })
    }
}

/// Strip one layer of matching quotes the model may wrap a quotation in.
fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')] {
        if let Some(inner) = s.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
            return inner.trim();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::entities::{Message, MessageId};
    use std::sync::Arc;

    fn batch() -> Vec<Candidate> {
        ["I'm planning my London trip for September, book Claridge's", "Cancel the spa"]
            .iter()
            .enumerate()
            .map(|(i, body)| {
                Candidate::new(
                    Arc::new(Message::new(
                        MessageId::try_new(format!("m{i}")).unwrap(),
                        "Layla Kawaguchi",
                        "2025-08-29T10:00:00Z",
                        *body,
                    )),
                    0,
                )
            })
            .collect()
    }

    #[test]
    fn test_no_answer_passes_through() {
        assert_eq!(ground(OracleVerdict::NoAnswer, &batch()), ValidationResult::NoAnswer);
    }

    #[test]
    fn test_grounded_fragment_is_kept() {
        let verdict = OracleVerdict::answer("\"London trip for September\"", 1);
        match ground(verdict, &batch()) {
            ValidationResult::Answer(a) => {
                assert_eq!(a.answer_text, "London trip for September");
                assert_eq!(a.source.message.id.as_str(), "m0");
                assert!(!a.repaired);
            }
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[test]
    fn test_ungrounded_text_is_replaced_by_source_body() {
        let verdict = OracleVerdict::answer("She travels in autumn", 1);
        match ground(verdict, &batch()) {
            ValidationResult::Answer(a) => {
                assert!(a.repaired);
                assert!(is_grounded(&a.answer_text, &a.source.message.body));
            }
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_index_is_no_answer() {
        assert_eq!(ground(OracleVerdict::answer("spa", 3), &batch()), ValidationResult::NoAnswer);
        assert_eq!(ground(OracleVerdict::answer("spa", 0), &batch()), ValidationResult::NoAnswer);
    }

    #[test]
    fn test_missing_index_single_candidate() {
        let single = &batch()[1..];
        let verdict = OracleVerdict::Answer {
            answer_text: "Cancel the spa".to_string(),
            source_number: None,
        };
        assert!(ground(verdict.clone(), single).is_answer());
        assert_eq!(ground(verdict, &batch()), ValidationResult::NoAnswer);
    }

    #[test]
    fn test_blank_answer_is_no_answer() {
        assert_eq!(ground(OracleVerdict::answer("  ", 1), &batch()), ValidationResult::NoAnswer);
    }

    #[test]
    fn test_is_grounded_ignores_case_and_whitespace() {
        assert!(is_grounded("book  CLARIDGE'S", "please Book Claridge's today"));
        assert!(!is_grounded("book the Ritz", "please Book Claridge's today"));
        assert!(!is_grounded("\"\"", "anything"));
    }
}
