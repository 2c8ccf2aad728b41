//! Durable message cache adapters.

mod json_cache;

pub use json_cache::JsonFileMessageCache;
