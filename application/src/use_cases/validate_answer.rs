//! Answer validation in capped batches.

use crate::config::RetryPolicy;
use crate::ports::answer_oracle::AnswerOracle;
use crate::use_cases::shared::with_retry;
use member_qa_domain::{Candidate, ValidationResult, ground};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends candidate batches to the oracle and grounds the verdicts.
pub struct AnswerValidator {
    oracle: Arc<dyn AnswerOracle>,
    max_batch: usize,
    retry: RetryPolicy,
}

impl AnswerValidator {
    pub fn new(oracle: Arc<dyn AnswerOracle>, max_batch: usize, retry: RetryPolicy) -> Self {
        Self {
            oracle,
            max_batch: max_batch.max(1),
            retry,
        }
    }

    /// Split a page's candidates into oracle-sized batches.
    ///
    /// Every candidate lands in exactly one batch; nothing is truncated.
    pub fn batches<'a>(
        &self,
        candidates: &'a [Candidate],
    ) -> impl Iterator<Item = &'a [Candidate]> {
        candidates.chunks(self.max_batch)
    }

    /// Validate one batch. Oracle failures after retries degrade to `NoAnswer`.
    pub async fn validate(&self, question: &str, batch: &[Candidate]) -> ValidationResult {
        if batch.is_empty() {
            return ValidationResult::NoAnswer;
        }
        let batch = &batch[..batch.len().min(self.max_batch)];

        let oracle = &self.oracle;
        match with_retry(&self.retry, "validate", || oracle.validate(question, batch)).await {
            Ok(verdict) => {
                let result = ground(verdict, batch);
                if let ValidationResult::Answer(answer) = &result {
                    if answer.repaired {
                        debug!(
                            id = %answer.source.message.id,
                            "Answer text was not grounded; using the full message body"
                        );
                    }
                } else {
                    debug!(batch = batch.len(), "No answer in batch");
                }
                result
            }
            Err(e) => {
                warn!(
                    batch = batch.len(),
                    error = %e,
                    "Validation failed, treating batch as no answer"
                );
                ValidationResult::NoAnswer
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::answer_oracle::OracleError;
    use crate::use_cases::fetch_pages::tests::message;
    use crate::use_cases::resolve_members::tests::MockOracle;
    use member_qa_domain::OracleVerdict;

    fn candidates(bodies: &[&str]) -> Vec<Candidate> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                Candidate::new(
                    Arc::new(message(&i.to_string(), "Layla Kawaguchi", "", body)),
                    0,
                )
            })
            .collect()
    }

    #[test]
    fn test_batches_cover_all_candidates() {
        let validator = AnswerValidator::new(Arc::new(MockOracle::new()), 12, RetryPolicy::none());
        let bodies: Vec<String> = (0..30).map(|i| format!("msg {i}")).collect();
        let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
        let all = candidates(&refs);

        let sizes: Vec<usize> = validator.batches(&all).map(<[Candidate]>::len).collect();
        assert_eq!(sizes, vec![12, 12, 6]);
    }

    #[tokio::test]
    async fn test_grounded_answer() {
        let oracle = Arc::new(
            MockOracle::new().with_verdict(Ok(OracleVerdict::answer("next month", 2))),
        );
        let validator = AnswerValidator::new(oracle, 12, RetryPolicy::none());
        let batch = candidates(&["hello", "London trip next month please"]);

        match validator.validate("When?", &batch).await {
            ValidationResult::Answer(answer) => {
                assert_eq!(answer.answer_text, "next month");
                assert_eq!(answer.source.message.id.as_str(), "1");
                assert!(!answer.repaired);
            }
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_no_answer() {
        let oracle = Arc::new(MockOracle::new().with_verdict(Ok(OracleVerdict::answer("x", 5))));
        let validator = AnswerValidator::new(oracle, 12, RetryPolicy::none());

        let result = validator.validate("q", &candidates(&["x"])).await;
        assert_eq!(result, ValidationResult::NoAnswer);
    }

    #[tokio::test]
    async fn test_exhausted_retries_degrade_to_no_answer() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_verdict(Err(OracleError::Malformed("not json".into())))
                .with_verdict(Err(OracleError::RateLimited)),
        );
        let validator = AnswerValidator::new(oracle.clone(), 12, RetryPolicy::immediate(1));

        let result = validator.validate("q", &candidates(&["x"])).await;
        assert_eq!(result, ValidationResult::NoAnswer);
        assert_eq!(oracle.validate_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_oracle() {
        let oracle = Arc::new(MockOracle::new());
        let validator = AnswerValidator::new(oracle.clone(), 12, RetryPolicy::none());

        assert_eq!(validator.validate("q", &[]).await, ValidationResult::NoAnswer);
        assert_eq!(oracle.validate_count(), 0);
    }
}
