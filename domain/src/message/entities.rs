//! Message entity and identity.

use crate::core::error::DomainError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque upstream identifier of a message.
///
/// The upstream source uses string identifiers, but numeric ids are accepted
/// on the wire and normalized to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidMessageId(
                "identifier is blank".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
            Missing(()),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => MessageId(s),
            RawId::Number(n) => MessageId(n.to_string()),
            RawId::Missing(()) => MessageId(String::new()),
        })
    }
}

/// Deduplication key of a message.
///
/// Messages with an upstream id are keyed by it; messages without one fall
/// back to their author, timestamp and body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKey {
    Id(String),
    Content(String, String, String),
}

/// A single member message (Entity)
///
/// Immutable once fetched. Unknown upstream fields are preserved in
/// [`extra`](Self::extra) so the cache round-trips records it does not
/// understand yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: MessageId,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "user_name", default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "message", default)]
    pub body: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn new(
        id: MessageId,
        author: impl Into<String>,
        timestamp: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id: String::new(),
            author: author.into(),
            timestamp: timestamp.into(),
            body: body.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn key(&self) -> MessageKey {
        if self.id.is_blank() {
            MessageKey::Content(
                self.author.clone(),
                self.timestamp.clone(),
                self.body.clone(),
            )
        } else {
            MessageKey::Id(self.id.as_str().to_string())
        }
    }

    /// Parse the timestamp as UTC.
    ///
    /// Accepts RFC 3339 and naive ISO 8601 (interpreted as UTC). Returns
    /// `None` for anything else.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn has_author(&self) -> bool {
        !self.author.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layla() -> Message {
        Message::new(
            MessageId::try_new("m-1").unwrap(),
            "Layla Kawaguchi",
            "2025-08-29T10:15:00+00:00",
            "Please book Claridge's in London for my trip.",
        )
    }

    #[test]
    fn test_deserialize_upstream_record() {
        let json = r#"{
            "id": "b1e9",
            "user_id": "u-7",
            "user_name": "Layla Kawaguchi",
            "timestamp": "2025-08-29T10:15:00.123456+00:00",
            "message": "Book Claridge's"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id.as_str(), "b1e9");
        assert_eq!(msg.author, "Layla Kawaguchi");
        assert_eq!(msg.body, "Book Claridge's");
        assert!(msg.extra.is_empty());
    }

    #[test]
    fn test_numeric_id_is_normalized() {
        let msg: Message =
            serde_json::from_str(r#"{"id": 42, "user_name": "A", "message": "hi"}"#).unwrap();
        assert_eq!(msg.id.as_str(), "42");
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = r#"{"id":"x","user_name":"A","message":"hi","timestamp":"","channel":"vip"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.extra.get("channel").unwrap(), "vip");

        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["channel"], "vip");
        assert_eq!(back["user_name"], "A");
    }

    #[test]
    fn test_key_prefers_id() {
        assert_eq!(layla().key(), MessageKey::Id("m-1".to_string()));
    }

    #[test]
    fn test_key_falls_back_to_content() {
        let msg: Message =
            serde_json::from_str(r#"{"user_name":"A","timestamp":"t","message":"hi"}"#).unwrap();
        assert_eq!(
            msg.key(),
            MessageKey::Content("A".to_string(), "t".to_string(), "hi".to_string())
        );
    }

    #[test]
    fn test_timestamp_parsing() {
        let ts = layla().timestamp_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-08-29T10:15:00+00:00");

        let naive = Message::new(MessageId::default(), "A", "2025-01-02T03:04:05", "x");
        assert!(naive.timestamp_utc().is_some());

        let bad = Message::new(MessageId::default(), "A", "last tuesday", "x");
        assert!(bad.timestamp_utc().is_none());
    }

    #[test]
    fn test_blank_id_rejected() {
        assert!(MessageId::try_new("  ").is_err());
    }
}
