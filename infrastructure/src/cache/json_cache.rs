//! JSON file message cache.
//!
//! The whole cache lives in memory behind a read/write guard and is written
//! back to one JSON document after every change:
//!
//! ```json
//! { "messages": [...], "cursor": 300, "remote_total": 3349 }
//! ```
//!
//! Unknown top-level fields are kept and written back. A file without a
//! `cursor` resumes from the number of cached messages. An unreadable or
//! corrupt file is logged and replaced by an empty cache.

use member_qa_application::ports::message_cache::{CacheError, MessageCache};
use member_qa_domain::{Message, MessageKey, PageCursor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cursor: Option<PageCursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_total: Option<u64>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default)]
struct CacheState {
    messages: Vec<Arc<Message>>,
    index: HashMap<MessageKey, usize>,
    cursor: PageCursor,
    remote_total: Option<u64>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl CacheState {
    fn from_document(doc: CacheDocument) -> Self {
        let fallback_cursor = PageCursor::new(doc.messages.len() as u64);
        let mut state = CacheState {
            cursor: doc.cursor.unwrap_or(fallback_cursor),
            remote_total: doc.remote_total,
            extra: doc.extra,
            ..Default::default()
        };
        state.merge(doc.messages);
        state
    }

    /// Insert or overwrite by identity. Returns how many were new.
    fn merge(&mut self, messages: impl IntoIterator<Item = Message>) -> usize {
        let mut added = 0;
        for message in messages {
            let key = message.key();
            match self.index.get(&key) {
                Some(&pos) => self.messages[pos] = Arc::new(message),
                None => {
                    self.index.insert(key, self.messages.len());
                    self.messages.push(Arc::new(message));
                    added += 1;
                }
            }
        }
        added
    }

    fn to_document(&self) -> CacheDocument {
        CacheDocument {
            messages: self.messages.iter().map(|m| m.as_ref().clone()).collect(),
            cursor: Some(self.cursor),
            remote_total: self.remote_total,
            extra: self.extra.clone(),
        }
    }
}

/// Message cache persisted as a single JSON file.
///
/// Safe to share between concurrent requests; writers are serialized by the
/// internal lock and the file is replaced atomically.
pub struct JsonFileMessageCache {
    path: Option<PathBuf>,
    state: RwLock<CacheState>,
}

impl JsonFileMessageCache {
    /// Open the cache at `path`, starting empty if the file is missing or corrupt.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::read_document(&path) {
            Ok(Some(doc)) => {
                let state = CacheState::from_document(doc);
                info!(
                    path = %path.display(),
                    messages = state.messages.len(),
                    cursor = %state.cursor,
                    "Loaded message cache"
                );
                state
            }
            Ok(None) => {
                debug!(path = %path.display(), "No message cache yet");
                CacheState::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Message cache unusable, starting empty");
                CacheState::default()
            }
        };
        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read_document(path: &Path) -> Result<Option<CacheDocument>, CacheError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Corrupt(e.to_string()))
    }

    /// Write the state to a sibling temp file, then rename it into place.
    fn persist(&self, state: &CacheState) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(&state.to_document())
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl MessageCache for JsonFileMessageCache {
    fn append(&self, messages: &[Message]) -> Result<usize, CacheError> {
        if messages.is_empty() {
            return Ok(0);
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let added = state.merge(messages.iter().cloned());
        debug!(received = messages.len(), added, "Merged messages into cache");
        self.persist(&state)?;
        Ok(added)
    }

    fn messages(&self, offset: usize, limit: usize) -> Vec<Arc<Message>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.messages.iter().skip(offset).take(limit).cloned().collect()
    }

    fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .len()
    }

    fn cursor(&self) -> PageCursor {
        self.state.read().unwrap_or_else(PoisonError::into_inner).cursor
    }

    fn advance_cursor(&self, cursor: PageCursor, total: Option<u64>) -> Result<(), CacheError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = state.cursor.advance_to(cursor);
        let total = total.or(state.remote_total);
        if next == state.cursor && total == state.remote_total {
            return Ok(());
        }
        state.cursor = next;
        state.remote_total = total;
        self.persist(&state)
    }

    fn remote_total(&self) -> Option<u64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .remote_total
    }
}
