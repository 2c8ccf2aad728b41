//! Upstream message source configuration (`[source]` section)

use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE_URL: &str = "https://november7-730026606190.europe-west1.run.app";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    /// Base URL of the messages API (`GET {base_url}/messages/`).
    pub base_url: String,
    /// Messages per request.
    pub page_size: usize,
    /// Minimum seconds between two page requests.
    pub min_fetch_interval_secs: u64,
    /// HTTP timeout per page request.
    pub timeout_secs: u64,
    /// Consecutive failed pages after which paging stops.
    pub max_fetch_failures: usize,
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOURCE_URL.to_string(),
            page_size: 100,
            min_fetch_interval_secs: 5,
            timeout_secs: 12,
            max_fetch_failures: 2,
        }
    }
}
