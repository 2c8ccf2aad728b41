//! Member names: what a page shows us and who a question is about.

use serde::{Deserialize, Serialize};

/// The members a question is believed to be about.
///
/// Empty means "do not filter by author".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMembers {
    names: Vec<String>,
}

impl ResolvedMembers {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolved = Self::default();
        for name in names {
            let name: String = name.into();
            let name = name.trim();
            if !name.is_empty() && !resolved.contains_author(name) {
                resolved.names.push(name.to_string());
            }
        }
        resolved
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Case-insensitive exact match against an author name.
    pub fn contains_author(&self, author: &str) -> bool {
        let author = author.trim().to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == author)
    }

    /// Same members regardless of order or case.
    pub fn same_members(&self, other: &ResolvedMembers) -> bool {
        self.names.len() == other.names.len()
            && self.names.iter().all(|n| other.contains_author(n))
    }

    /// Heuristic resolution: keep observed names that a parsed name
    /// candidate matches exactly or as a case-insensitive substring.
    pub fn match_candidates(name_candidates: &[String], observed: &[String]) -> Self {
        Self::new(
            observed
                .iter()
                .filter(|member| name_candidates.iter().any(|c| names_match(c, member)))
                .cloned(),
        )
    }
}

/// "Layla" matches "Layla Kawaguchi", and the other way round.
pub fn names_match(candidate: &str, member: &str) -> bool {
    let candidate = candidate.trim().to_lowercase();
    let member = member.trim().to_lowercase();
    if candidate.is_empty() || member.is_empty() {
        return false;
    }
    member == candidate || member.contains(&candidate) || candidate.contains(&member)
}

/// Member names observed so far during one request.
///
/// Names are kept in first-seen order, deduplicated case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MemberRoster {
    names: Vec<String>,
}

impl MemberRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record names from a page. Returns `true` if any of them was new.
    pub fn observe<'a, I>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = false;
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let lower = name.to_lowercase();
            if !self.names.iter().any(|n| n.to_lowercase() == lower) {
                self.names.push(name.to_string());
                added = true;
            }
        }
        added
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names to offer the resolver, at most `max`.
    ///
    /// Names matching a parsed candidate come first so a large roster never
    /// crowds out the member the question mentions.
    pub fn offered(&self, max: usize, name_candidates: &[String]) -> Vec<String> {
        let (matching, rest): (Vec<&String>, Vec<&String>) = self
            .names
            .iter()
            .partition(|n| name_candidates.iter().any(|c| names_match(c, n)));

        matching.into_iter().chain(rest).take(max).cloned().collect()
    }
}
