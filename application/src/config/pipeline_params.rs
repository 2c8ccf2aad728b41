//! Pipeline parameters: knobs consumed by the retrieval-and-validation loop.
//!
//! These are application-layer concerns: the infrastructure config loader
//! maps its file/env representation onto [`PipelineParams`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry for transient oracle failures.
///
/// Attempt `n` (1-based, after the first call) waits `base_backoff * 2^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts after the first call.
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No retries, no waiting.
    pub fn none() -> Self {
        Self::immediate(0)
    }

    /// Retry without waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_backoff: Duration::ZERO,
        }
    }

    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(5);
        self.base_backoff.saturating_mul(1 << exp)
    }
}

/// Retrieval-and-validation loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Messages requested per upstream page, and per replayed cache chunk.
    pub page_size: usize,
    /// Minimum wait between two upstream requests of the same fetcher.
    pub min_fetch_interval: Duration,
    /// Candidates shown to the validator per oracle call.
    pub max_validator_messages: usize,
    /// Member names offered to the resolver per oracle call.
    pub max_resolver_names: usize,
    /// Stop paging once an answer reaches this confidence.
    pub confidence_threshold: f64,
    /// Upper bound on pages (cached and remote) per request. `None` = unbounded.
    pub max_pages: Option<usize>,
    /// Consecutive upstream failures after which remote paging stops.
    pub max_fetch_failures: usize,
    pub oracle_retry: RetryPolicy,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            page_size: 100,
            min_fetch_interval: Duration::from_secs(5),
            max_validator_messages: 12,
            max_resolver_names: 50,
            confidence_threshold: 0.75,
            max_pages: None,
            max_fetch_failures: 2,
            oracle_retry: RetryPolicy::default(),
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn with_min_fetch_interval(mut self, interval: Duration) -> Self {
        self.min_fetch_interval = interval;
        self
    }

    pub fn with_max_validator_messages(mut self, max: usize) -> Self {
        self.max_validator_messages = max.max(1);
        self
    }

    pub fn with_max_resolver_names(mut self, max: usize) -> Self {
        self.max_resolver_names = max.max(1);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_pages(mut self, max: Option<usize>) -> Self {
        self.max_pages = max.filter(|m| *m > 0);
        self
    }

    pub fn with_max_fetch_failures(mut self, max: usize) -> Self {
        self.max_fetch_failures = max.max(1);
        self
    }

    pub fn with_oracle_retry(mut self, retry: RetryPolicy) -> Self {
        self.oracle_retry = retry;
        self
    }
}
