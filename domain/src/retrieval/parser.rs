//! Heuristic question parsing.
//!
//! Extracts the people a question is probably about and the words worth
//! searching message bodies for. Pure and deterministic; the name heuristic
//! is deliberately lossy because member resolution gets a second chance from
//! the oracle.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Keywords shorter than this are dropped.
pub const MIN_KEYWORD_LEN: usize = 3;

/// A capitalized word directly after one of these is treated as a place.
const LOCATION_CUES: &[&str] = &["to", "in", "at", "into", "onto", "towards", "from"];

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by", "can",
    "could", "did", "do", "does", "find", "for", "from", "give", "has", "have", "he", "her",
    "him", "his", "how", "i", "in", "into", "is", "it", "list", "me", "mine", "my", "of", "on",
    "onto", "or", "our", "ours", "please", "she", "should", "show", "tell", "that", "the",
    "their", "them", "there", "they", "this", "to", "towards", "was", "we", "were", "what",
    "when", "where", "which", "who", "whom", "whose", "why", "will", "with", "would", "you",
    "your", "yours",
];

static NAME_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?(?:[ \t]+\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?)*")
        .expect("name pattern is valid")
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}']+").expect("token pattern is valid"));

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Output of [`QuestionParser::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    /// Capitalized runs that look like person names, in order of first occurrence.
    pub name_candidates: Vec<String>,
    /// Lowercase search tokens, deduplicated in order of first occurrence.
    pub keywords: Vec<String>,
}

impl ParsedQuestion {
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// Heuristic parser for name candidates and topic keywords
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionParser;

impl QuestionParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, question: &str) -> ParsedQuestion {
        ParsedQuestion {
            name_candidates: self.extract_names(question),
            keywords: self.extract_keywords(question),
        }
    }

    fn extract_names(&self, question: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for run in NAME_RUN.find_iter(question) {
            if preceded_by_location_cue(question, run.start()) {
                continue;
            }

            // Leading words like "When" or "Tell" are capitalized by position, not by name.
            let words: Vec<&str> = run
                .as_str()
                .split_whitespace()
                .skip_while(|w| is_stop_word(&w.to_lowercase()))
                .collect();
            if words.is_empty() {
                continue;
            }

            let name = words.join(" ");
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
        }

        names
    }

    fn extract_keywords(&self, question: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();

        for token in TOKEN.find_iter(question) {
            let word = normalize_token(token.as_str());
            if word.chars().count() < MIN_KEYWORD_LEN || is_stop_word(&word) {
                continue;
            }
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }

        keywords
    }
}

/// Lowercase, drop a possessive `'s` and stray apostrophes.
fn normalize_token(token: &str) -> String {
    let lower = token.to_lowercase();
    let trimmed = lower.trim_matches('\'');
    trimmed
        .strip_suffix("'s")
        .unwrap_or(trimmed)
        .to_string()
}

fn preceded_by_location_cue(text: &str, start: usize) -> bool {
    TOKEN
        .find_iter(&text[..start])
        .last()
        .map(|t| LOCATION_CUES.contains(&t.as_str().to_lowercase().as_str()))
        .unwrap_or(false)
}
