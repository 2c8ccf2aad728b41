//! Sync Messages use case.
//!
//! Warms the durable cache by paging the upstream source from the persisted
//! cursor, without asking a question.

use crate::config::PipelineParams;
use crate::ports::message_cache::MessageCache;
use crate::ports::message_source::MessageSource;
use crate::ports::progress::{AskProgressNotifier, NoProgress};
use crate::use_cases::fetch_pages::{PageStream, PaginatedFetcher};
use member_qa_domain::PageCursor;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// What one sync run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub messages_received: usize,
    pub cached_total: usize,
    pub cursor: PageCursor,
    pub remote_total: Option<u64>,
}

pub struct SyncMessagesUseCase {
    cache: Arc<dyn MessageCache>,
    source: Arc<dyn MessageSource>,
    params: PipelineParams,
}

impl SyncMessagesUseCase {
    pub fn new(cache: Arc<dyn MessageCache>, source: Arc<dyn MessageSource>) -> Self {
        Self {
            cache,
            source,
            params: PipelineParams::default(),
        }
    }

    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(&self, max_pages: Option<usize>) -> SyncReport {
        self.execute_with_progress(max_pages, &NoProgress).await
    }

    /// Fetch up to `max_pages` upstream pages (`None` = until exhausted).
    pub async fn execute_with_progress(
        &self,
        max_pages: Option<usize>,
        progress: &dyn AskProgressNotifier,
    ) -> SyncReport {
        let fetcher = PaginatedFetcher::new(
            self.source.clone(),
            self.params.page_size,
            self.params.min_fetch_interval,
        );
        let mut pages = PageStream::remote_only(
            self.cache.clone(),
            fetcher,
            max_pages.filter(|m| *m > 0),
            self.params.max_fetch_failures,
        );
        info!(cursor = %self.cache.cursor(), "Syncing messages");

        let mut fetched = 0;
        let mut received = 0;
        while let Some(next) = pages.next_page().await {
            match next {
                Ok(page) => {
                    fetched += 1;
                    received += page.messages.len();
                    progress.on_page(page.index, page.origin, page.messages.len());
                }
                Err(e) => {
                    let index = pages.pages_yielded().saturating_sub(1);
                    progress.on_page_failed(index, &e.to_string());
                }
            }
        }

        let report = SyncReport {
            pages_fetched: fetched,
            pages_failed: pages.failures(),
            messages_received: received,
            cached_total: self.cache.len(),
            cursor: self.cache.cursor(),
            remote_total: self.cache.remote_total(),
        };
        info!(?report, "Sync finished");
        progress.on_complete(report.pages_failed == 0);
        report
    }
}
