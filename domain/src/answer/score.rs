//! Answer scoring and the best-so-far accumulator.
//!
//! # Scoring
//!
//! A validated answer is ranked by the number of question keywords found in
//! its source message, ties broken by message recency (newer wins, missing
//! timestamps lose). Confidence is the share of keywords matched:
//!
//! ```text
//! confidence = keyword_matches / keyword_count     (1.0 when keyword_count = 0)
//! ```

use super::verdict::GroundedAnswer;
use crate::retrieval::filter::count_keyword_matches;
use chrono::{DateTime, Utc};

/// Lexicographic score: keyword matches first, then recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnswerScore {
    pub keyword_matches: usize,
    pub recency: Option<DateTime<Utc>>,
}

impl AnswerScore {
    pub fn for_answer(answer: &GroundedAnswer, keywords: &[String]) -> Self {
        let message = &answer.source.message;
        Self {
            keyword_matches: count_keyword_matches(&message.body, keywords),
            recency: message.timestamp_utc(),
        }
    }

    pub fn confidence(&self, keyword_count: usize) -> f64 {
        if keyword_count == 0 {
            return 1.0;
        }
        (self.keyword_matches as f64 / keyword_count as f64).min(1.0)
    }
}

/// A validated answer with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAnswer {
    pub answer: GroundedAnswer,
    pub score: AnswerScore,
    pub confidence: f64,
}

impl ScoredAnswer {
    pub fn new(answer: GroundedAnswer, keywords: &[String]) -> Self {
        let score = AnswerScore::for_answer(&answer, keywords);
        let confidence = score.confidence(keywords.len());
        Self {
            answer,
            score,
            confidence,
        }
    }

    pub fn meets(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Best answer seen during one request.
///
/// Replaced only by a strictly better score.
#[derive(Debug, Clone, Default)]
pub struct BestAnswer {
    current: Option<ScoredAnswer>,
}

impl BestAnswer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate answer. Returns `true` if it became the new best.
    pub fn offer(&mut self, candidate: ScoredAnswer) -> bool {
        let better = match &self.current {
            Some(best) => candidate.score > best.score,
            None => true,
        };
        if better {
            self.current = Some(candidate);
        }
        better
    }

    pub fn get(&self) -> Option<&ScoredAnswer> {
        self.current.as_ref()
    }

    pub fn into_inner(self) -> Option<ScoredAnswer> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::entities::{Message, MessageId};
    use crate::retrieval::filter::Candidate;
    use std::sync::Arc;

    fn answer(id: &str, ts: &str, body: &str) -> GroundedAnswer {
        GroundedAnswer {
            answer_text: body.to_string(),
            source: Candidate::new(
                Arc::new(Message::new(MessageId::try_new(id).unwrap(), "A", ts, body)),
                0,
            ),
            repaired: false,
        }
    }

    fn kw(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_more_keywords_wins() {
        let keywords = kw(&["london", "trip"]);
        let a = ScoredAnswer::new(answer("1", "2025-09-01T00:00:00Z", "London"), &keywords);
        let b = ScoredAnswer::new(answer("2", "2024-01-01T00:00:00Z", "London trip"), &keywords);
        assert!(b.score > a.score);
    }

    #[test]
    fn test_recency_breaks_ties() {
        let keywords = kw(&["london"]);
        let old = ScoredAnswer::new(answer("1", "2024-01-01T00:00:00Z", "London"), &keywords);
        let new = ScoredAnswer::new(answer("2", "2025-01-01T00:00:00Z", "London"), &keywords);
        let undated = ScoredAnswer::new(answer("3", "", "London"), &keywords);
        assert!(new.score > old.score);
        assert!(old.score > undated.score);
    }

    #[test]
    fn test_confidence_ratio() {
        let keywords = kw(&["layla", "planning", "trip", "london"]);
        let s = ScoredAnswer::new(
            answer("1", "", "I'm planning my trip to London"),
            &keywords,
        );
        assert_eq!(s.score.keyword_matches, 3);
        assert!((s.confidence - 0.75).abs() < f64::EPSILON);
        assert!(s.meets(0.75));
        assert!(!s.meets(0.8));
    }

    #[test]
    fn test_confidence_without_keywords_is_full() {
        assert_eq!(
            AnswerScore {
                keyword_matches: 0,
                recency: None
            }
            .confidence(0),
            1.0
        );
    }

    #[test]
    fn test_best_answer_keeps_strictly_better() {
        let keywords = kw(&["london"]);
        let scored = |id: &str, ts: &str| ScoredAnswer::new(answer(id, ts, "London"), &keywords);
        let mut best = BestAnswer::new();
        assert!(best.offer(scored("1", "2025-01-01T00:00:00Z")));
        // Equal score does not replace.
        assert!(!best.offer(scored("2", "2025-01-01T00:00:00Z")));
        assert!(!best.offer(scored("3", "2020-01-01T00:00:00Z")));
        assert_eq!(best.get().unwrap().answer.source.message.id.as_str(), "1");

        assert!(best.offer(scored("4", "2026-01-01T00:00:00Z")));
        assert_eq!(best.into_inner().unwrap().answer.source.message.id.as_str(), "4");
    }
}
