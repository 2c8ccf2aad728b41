//! Message source port
//!
//! Defines how the application reads pages from the upstream member message
//! collection.

use async_trait::async_trait;
use member_qa_domain::{MessagePage, PageCursor};
use thiserror::Error;

/// Errors fetching one page from the upstream source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Unable to reach message source: {0}")]
    ConnectionError(String),

    #[error("Message source responded with status {0}")]
    Status(u16),

    #[error("Unexpected response format from message source: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Paginated, read-only upstream collection of member messages.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `page_size` messages starting at `cursor`.
    async fn fetch_page(
        &self,
        cursor: PageCursor,
        page_size: usize,
    ) -> Result<MessagePage, SourceError>;
}
