//! Prompt templates for the oracle calls

use crate::retrieval::filter::Candidate;

/// Templates for generating oracle prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for member name resolution
    pub fn resolver_system() -> &'static str {
        r#"You pick member names from a provided list that the question is about.
Resolve pronouns and implicit references ("her", "that trip", "my assistant's client") against names mentioned earlier in the conversation or in the question.
Only return names exactly as they appear in the list. If none match, return an empty list."#
    }

    /// User prompt for member name resolution
    ///
    /// `earlier` holds previous questions of the same conversation, oldest
    /// first.
    pub fn resolver_prompt(question: &str, earlier: &[String], names: &[String]) -> String {
        let mut prompt = String::new();
        if !earlier.is_empty() {
            prompt.push_str("Conversation so far:\n");
            for turn in earlier {
                prompt.push_str(&format!("- {}\n", turn));
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!(
            r#"Question:
{}

Available member names:
"#,
            question
        ));

        for (idx, name) in names.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", idx + 1, name));
        }

        prompt.push_str(
            "\nReturn only the members whose names are clearly referenced or implied by the question.",
        );

        prompt
    }

    /// System prompt for answer validation
    pub fn validator_system() -> &'static str {
        r#"You are an assistant that must stick strictly to the provided messages.
You never invent facts and never answer from general knowledge."#
    }

    /// User prompt for answer validation
    ///
    /// Candidates are numbered from 1; the oracle reports the number of the
    /// message it quotes.
    pub fn validator_prompt(question: &str, candidates: &[Candidate]) -> String {
        let mut prompt = format!(
            r#"You must answer the user's question using only the candidate messages below.
Rules:
1. Use only the provided message text; ignore metadata.
2. The answer text must be copied verbatim from exactly one candidate message.
3. If a message answers the question, report found = true with the quoted answer text and the candidate number.
4. If no message answers it, report found = false.

Question: {}

Candidate messages:
"#,
            question
        );

        for (idx, candidate) in candidates.iter().enumerate() {
            let message = &candidate.message;
            let author = if message.has_author() {
                message.author.as_str()
            } else {
                "unknown"
            };
            prompt.push_str(&format!("{}. {}: {}\n", idx + 1, author, message.body));
        }

        prompt
    }
}
