//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod answer_question;
pub mod fetch_pages;
pub mod resolve_members;
pub(crate) mod shared;
pub mod sync_messages;
pub mod validate_answer;
