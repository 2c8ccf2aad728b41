//! Message cache port
//!
//! Durable mapping from message identity to message record, shared by all
//! in-flight requests. Implementations guard their state internally, so
//! every method takes `&self`.

use member_qa_domain::{Message, PageCursor};
use std::sync::Arc;
use thiserror::Error;

/// Errors from the durable message store
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file is corrupt: {0}")]
    Corrupt(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

pub trait MessageCache: Send + Sync {
    /// Merge messages keyed by identity. Duplicates overwrite in place.
    ///
    /// Returns the number of messages that were not cached before.
    fn append(&self, messages: &[Message]) -> Result<usize, CacheError>;

    /// Up to `limit` cached messages starting at `offset`, in fetch order.
    fn messages(&self, offset: usize, limit: usize) -> Vec<Arc<Message>>;

    /// Number of cached messages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every cached message in fetch order.
    fn all_messages(&self) -> Vec<Arc<Message>> {
        self.messages(0, self.len())
    }

    /// Next unfetched upstream offset.
    fn cursor(&self) -> PageCursor;

    /// Move the cursor forward and record the upstream total if known.
    ///
    /// A cursor behind the current one is ignored.
    fn advance_cursor(&self, cursor: PageCursor, total: Option<u64>) -> Result<(), CacheError>;

    /// Upstream total last reported by the source.
    fn remote_total(&self) -> Option<u64>;
}
