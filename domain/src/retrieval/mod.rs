//! Cheap lexical retrieval: question parsing, member names and candidate filtering.

pub mod filter;
pub mod members;
pub mod parser;
