//! Name resolution.
//!
//! Decides which members a question is about. The oracle is asked first,
//! against the names observed so far; parsed name candidates matched
//! against those names are the fallback whenever the oracle fails or gives
//! nothing usable. A question that names nobody ("when is her flight?")
//! borrows the names of the latest earlier turn that did.

use crate::config::RetryPolicy;
use crate::ports::answer_oracle::AnswerOracle;
use crate::use_cases::shared::with_retry;
use member_qa_domain::{MemberRoster, ParsedQuestion, QuestionParser, ResolvedMembers, names_match};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub members: ResolvedMembers,
    /// Whether the oracle produced the result (false = heuristic fallback).
    pub via_oracle: bool,
}

pub struct NameResolver {
    oracle: Arc<dyn AnswerOracle>,
    max_names: usize,
    retry: RetryPolicy,
}

impl NameResolver {
    pub fn new(oracle: Arc<dyn AnswerOracle>, max_names: usize, retry: RetryPolicy) -> Self {
        Self {
            oracle,
            max_names: max_names.max(1),
            retry,
        }
    }

    /// `earlier` holds previous questions of the same conversation, oldest first.
    pub async fn resolve(
        &self,
        question: &str,
        earlier: &[String],
        parsed: &ParsedQuestion,
        roster: &MemberRoster,
    ) -> Resolution {
        if roster.is_empty() {
            return Resolution {
                members: ResolvedMembers::empty(),
                via_oracle: false,
            };
        }

        let referenced = referenced_names(parsed, earlier);
        let offered = roster.offered(self.max_names, &referenced);
        debug!(offered = offered.len(), observed = roster.len(), "Resolving members");

        let oracle = &self.oracle;
        let result = with_retry(&self.retry, "select_members", || {
            oracle.select_members(question, earlier, &offered)
        })
        .await;

        match result {
            Ok(selected) => {
                let usable = ResolvedMembers::new(
                    selected
                        .iter()
                        .filter_map(|name| canonical_name(name, &offered))
                        .map(String::from),
                );
                if !usable.is_empty() {
                    info!(members = ?usable.names(), "Members resolved by oracle");
                    return Resolution {
                        members: usable,
                        via_oracle: true,
                    };
                }
                debug!(returned = ?selected, "Oracle chose no usable members, using heuristic");
            }
            Err(e) => {
                warn!(error = %e, "Member resolution failed, using heuristic");
            }
        }

        let members = ResolvedMembers::match_candidates(&referenced, roster.names());
        info!(members = ?members.names(), "Members resolved heuristically");
        Resolution {
            members,
            via_oracle: false,
        }
    }
}

/// Names the question refers to: its own candidates, or else those of the
/// most recent earlier turn that mentioned anyone.
fn referenced_names(parsed: &ParsedQuestion, earlier: &[String]) -> Vec<String> {
    if !parsed.name_candidates.is_empty() {
        return parsed.name_candidates.clone();
    }
    let parser = QuestionParser::new();
    earlier
        .iter()
        .rev()
        .map(|turn| parser.parse(turn).name_candidates)
        .find(|names| !names.is_empty())
        .unwrap_or_default()
}

/// Map an oracle-chosen name onto the offered spelling.
///
/// Exact (case-insensitive) matches win; otherwise a unique substring match
/// is accepted. Names the oracle invented are dropped.
fn canonical_name<'a>(chosen: &str, offered: &'a [String]) -> Option<&'a str> {
    let lower = chosen.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if let Some(exact) = offered.iter().find(|n| n.to_lowercase() == lower) {
        return Some(exact.as_str());
    }
    let mut partial = offered.iter().filter(|n| names_match(chosen, n));
    match (partial.next(), partial.next()) {
        (Some(only), None) => Some(only.as_str()),
        _ => None,
    }
}
