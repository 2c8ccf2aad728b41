//! Progress display while a question is answered or the cache is synced.

pub mod reporter;
