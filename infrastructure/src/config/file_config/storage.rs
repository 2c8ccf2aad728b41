//! Cache and logging configuration (`[cache]` and `[logging]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    /// JSON file holding cached messages and the page cursor.
    pub path: PathBuf,
    /// When false, messages are cached in memory for this process only.
    pub enabled: bool,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/messages_cache.json"),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}
