//! Candidate filtering.
//!
//! A conjunctive precision filter over one page: author must be a resolved
//! member (when any are resolved) and the body must contain a keyword (when
//! there are keywords). Its only job is to shrink what the validator sees.

use super::members::ResolvedMembers;
use crate::message::entities::Message;
use std::sync::Arc;

/// A message that survived filtering, with the page it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub message: Arc<Message>,
    pub page_index: usize,
}

impl Candidate {
    pub fn new(message: Arc<Message>, page_index: usize) -> Self {
        Self {
            message,
            page_index,
        }
    }
}

/// Number of keywords occurring in `body` (case-insensitive substring).
pub fn count_keyword_matches(body: &str, keywords: &[String]) -> usize {
    let lowered = body.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lowered.contains(kw.as_str()))
        .count()
}

pub fn filter_candidates(
    page: &[Arc<Message>],
    page_index: usize,
    members: &ResolvedMembers,
    keywords: &[String],
) -> Vec<Candidate> {
    page.iter()
        .filter(|msg| members.is_empty() || members.contains_author(&msg.author))
        .filter(|msg| keywords.is_empty() || count_keyword_matches(&msg.body, keywords) > 0)
        .map(|msg| Candidate::new(Arc::clone(msg), page_index))
        .collect()
}
