//! Interactive chat module
//!
//! Provides a line-editor based interactive chat for asking several
//! questions against the same process-wide cache.

mod repl;

pub use repl::ChatRepl;
