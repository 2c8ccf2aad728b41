//! Pagination value objects.

use super::entities::Message;
use serde::{Deserialize, Serialize};

/// Offset of the next unfetched message in the upstream source.
///
/// Only moves forward: [`advance_to`](Self::advance_to) never returns a
/// smaller cursor than `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(u64);

impl PageCursor {
    pub const START: PageCursor = PageCursor(0);

    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> u64 {
        self.0
    }

    /// Move to `next`, keeping the current position if `next` is behind it.
    pub fn advance_to(self, next: PageCursor) -> PageCursor {
        self.max(next)
    }

    pub fn advanced_by(self, count: u64) -> PageCursor {
        PageCursor(self.0.saturating_add(count))
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page returned by the upstream message source.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePage {
    pub items: Vec<Message>,
    /// Where the following page starts.
    pub next_cursor: PageCursor,
    /// Whether the source reports further pages.
    pub has_more: bool,
    /// Total number of messages upstream, when the source reports it.
    pub total: Option<u64>,
}

impl MessagePage {
    /// Build a page from an offset-based response.
    ///
    /// `returned` is the number of records the source sent, readable or not;
    /// the cursor moves past all of them. `has_more` is false once the
    /// source sent nothing or the reported total is reached.
    pub fn from_offset(
        items: Vec<Message>,
        returned: usize,
        requested: PageCursor,
        total: Option<u64>,
    ) -> Self {
        let returned = returned.max(items.len()) as u64;
        let next_cursor = requested.advanced_by(returned);
        let has_more = returned > 0 && total.is_none_or(|t| next_cursor.offset() < t);
        Self {
            items,
            next_cursor,
            has_more,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
