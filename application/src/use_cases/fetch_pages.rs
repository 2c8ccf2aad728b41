//! Paginated fetching and the progressive page stream.
//!
//! [`PaginatedFetcher`] pages through the upstream source with a fixed
//! minimum interval between requests. [`PageStream`] is the lazy,
//! restartable sequence the orchestrator consumes: it replays cached
//! messages first, then continues with fresh upstream pages from the
//! persisted cursor, feeding each into the cache.

use crate::ports::message_cache::MessageCache;
use crate::ports::message_source::{MessageSource, SourceError};
use crate::ports::progress::PageOrigin;
use member_qa_domain::{Message, MessagePage, PageCursor};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Rate-limited access to the upstream source.
///
/// The interval is a hard wait before every request after the first, not a
/// retry backoff.
pub struct PaginatedFetcher {
    source: Arc<dyn MessageSource>,
    page_size: usize,
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl PaginatedFetcher {
    pub fn new(source: Arc<dyn MessageSource>, page_size: usize, min_interval: Duration) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            min_interval,
            last_request: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn fetch_page(&mut self, cursor: PageCursor) -> Result<MessagePage, SourceError> {
        if let Some(last) = self.last_request {
            let ready_at = last + self.min_interval;
            if Instant::now() < ready_at {
                debug!("Waiting {:?} before next upstream request", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_request = Some(Instant::now());

        info!(skip = cursor.offset(), limit = self.page_size, "Fetching messages");
        self.source.fetch_page(cursor, self.page_size).await
    }
}

/// One page handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct StreamedPage {
    /// Position in this stream, starting at 0.
    pub index: usize,
    pub origin: PageOrigin,
    pub messages: Vec<Arc<Message>>,
}

/// Cached-then-fresh page sequence.
///
/// Finite: ends when the source reports no more pages, the page budget is
/// spent, or too many consecutive upstream requests fail. Restartable: a new
/// stream over the same cache resumes from the persisted cursor.
pub struct PageStream {
    cache: Arc<dyn MessageCache>,
    fetcher: PaginatedFetcher,
    max_pages: Option<usize>,
    max_failures: usize,
    cached_offset: usize,
    cached_end: usize,
    cursor: PageCursor,
    /// False once a failed page was skipped; later cursors are then not persisted.
    contiguous: bool,
    remote_done: bool,
    consecutive_failures: usize,
    yielded: usize,
    failures: usize,
    last_error: Option<SourceError>,
}

impl PageStream {
    /// Stream that replays the cache before fetching.
    pub fn new(
        cache: Arc<dyn MessageCache>,
        fetcher: PaginatedFetcher,
        max_pages: Option<usize>,
        max_failures: usize,
    ) -> Self {
        let cached_end = cache.len();
        let cursor = cache.cursor();
        let remote_done = cache.remote_total().is_some_and(|total| cursor.offset() >= total);
        if remote_done {
            debug!(cursor = %cursor, "Cache holds the full upstream corpus");
        }
        Self {
            cache,
            fetcher,
            max_pages,
            max_failures: max_failures.max(1),
            cached_offset: 0,
            cached_end,
            cursor,
            contiguous: true,
            remote_done,
            consecutive_failures: 0,
            yielded: 0,
            failures: 0,
            last_error: None,
        }
    }

    /// Stream that only fetches upstream pages, starting at the persisted cursor.
    ///
    /// Always asks upstream at least once, even when the persisted total says
    /// the cache is complete: the upstream corpus may have grown since.
    pub fn remote_only(
        cache: Arc<dyn MessageCache>,
        fetcher: PaginatedFetcher,
        max_pages: Option<usize>,
        max_failures: usize,
    ) -> Self {
        let mut stream = Self::new(cache, fetcher, max_pages, max_failures);
        stream.cached_offset = stream.cached_end;
        stream.remote_done = false;
        stream
    }

    /// Next page, or `None` when the sequence is finished.
    ///
    /// An `Err` reports one failed upstream page; the stream skips it and
    /// can still be polled.
    pub async fn next_page(&mut self) -> Option<Result<StreamedPage, SourceError>> {
        if self.max_pages.is_some_and(|max| self.yielded >= max) {
            return None;
        }

        if self.cached_offset < self.cached_end {
            let limit = self.fetcher.page_size().min(self.cached_end - self.cached_offset);
            let messages = self.cache.messages(self.cached_offset, limit);
            // The cache only grows, but guard against an empty read anyway.
            if !messages.is_empty() {
                self.cached_offset += messages.len();
                return Some(Ok(self.emit(PageOrigin::Cache, messages)));
            }
            self.cached_offset = self.cached_end;
        }

        if self.remote_done {
            return None;
        }

        let requested = self.cursor;
        match self.fetcher.fetch_page(requested).await {
            Ok(page) => {
                self.consecutive_failures = 0;
                Some(Ok(self.absorb_remote(requested, page)))
            }
            Err(e) => {
                warn!(skip = requested.offset(), error = %e, "Failed to fetch page");
                self.failures += 1;
                self.consecutive_failures += 1;
                self.last_error = Some(e.clone());
                self.contiguous = false;
                self.cursor = requested.advanced_by(self.fetcher.page_size() as u64);
                if self.consecutive_failures >= self.max_failures {
                    warn!(
                        failures = self.consecutive_failures,
                        "Stopping upstream paging after repeated failures"
                    );
                    self.remote_done = true;
                }
                // A failed request still counts against the page budget.
                self.yielded += 1;
                Some(Err(e))
            }
        }
    }

    fn absorb_remote(&mut self, requested: PageCursor, page: MessagePage) -> StreamedPage {
        if let Err(e) = self.cache.append(&page.items) {
            warn!(error = %e, "Failed to persist fetched messages; continuing in memory");
        }

        self.cursor = requested.advance_to(page.next_cursor);
        if self.contiguous
            && let Err(e) = self.cache.advance_cursor(self.cursor, page.total)
        {
            warn!(error = %e, "Failed to persist page cursor");
        }

        // A page of unreadable records still moves the cursor; only a
        // stalled cursor or the source itself ends paging.
        if !page.has_more || self.cursor == requested {
            debug!(cursor = %self.cursor, "Upstream source exhausted");
            self.remote_done = true;
        }

        let messages = page.items.into_iter().map(Arc::new).collect();
        self.emit(PageOrigin::Remote, messages)
    }

    fn emit(&mut self, origin: PageOrigin, messages: Vec<Arc<Message>>) -> StreamedPage {
        let page = StreamedPage {
            index: self.yielded,
            origin,
            messages,
        };
        self.yielded += 1;
        page
    }

    /// Pages produced so far, failed ones included.
    pub fn pages_yielded(&self) -> usize {
        self.yielded
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }
}
