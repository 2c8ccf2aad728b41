//! Answers: oracle verdicts, grounding, scoring and the final outcome.

pub mod outcome;
pub mod score;
pub mod verdict;
