//! Prompt domain
//!
//! Templates for the two oracle operations: member name resolution and
//! answer validation.

mod template;

pub use template::PromptTemplate;
