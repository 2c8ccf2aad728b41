//! HTTP adapter for the paginated messages API.
//!
//! `GET {base_url}/messages/?skip=<offset>&limit=<page_size>` answers with
//! `{"items": [...], "total": <n>}`. Sources that report `next_cursor` /
//! `has_more` themselves are honoured; otherwise both are derived from the
//! offset, the item count and `total`.

use async_trait::async_trait;
use member_qa_application::ports::message_source::{MessageSource, SourceError};
use member_qa_domain::{Message, MessagePage, PageCursor};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!("member-qa/", env!("CARGO_PKG_VERSION"));

pub struct HttpMessageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMessageSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::ConnectionError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn messages_url(&self) -> String {
        format!("{}/messages/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn fetch_page(
        &self,
        cursor: PageCursor,
        page_size: usize,
    ) -> Result<MessagePage, SourceError> {
        let response = self
            .client
            .get(self.messages_url())
            .query(&[("skip", cursor.offset()), ("limit", page_size as u64)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "Message source returned an error status");
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        let page = parse_page(body, cursor)?;
        debug!(
            skip = cursor.offset(),
            items = page.items.len(),
            total = ?page.total,
            has_more = page.has_more,
            "Received page"
        );
        Ok(page)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else if let Some(status) = e.status() {
        SourceError::Status(status.as_u16())
    } else {
        SourceError::ConnectionError(e.to_string())
    }
}

/// Turn a response body into a page.
///
/// Items that cannot be read as messages are skipped rather than failing the
/// whole page.
pub(crate) fn parse_page(body: Value, requested: PageCursor) -> Result<MessagePage, SourceError> {
    let mut object = match body {
        Value::Object(object) => object,
        Value::Array(items) => {
            let returned = items.len();
            let items = parse_items(items);
            return Ok(MessagePage::from_offset(items, returned, requested, None));
        }
        other => {
            return Err(SourceError::InvalidResponse(format!(
                "expected an object, got {}",
                type_name(&other)
            )));
        }
    };

    let (items, returned) = match object.remove("items") {
        Some(Value::Array(items)) => {
            let returned = items.len();
            (parse_items(items), returned)
        }
        Some(Value::Null) | None => (Vec::new(), 0),
        Some(other) => {
            return Err(SourceError::InvalidResponse(format!(
                "`items` must be an array, got {}",
                type_name(&other)
            )));
        }
    };
    let total = object.get("total").and_then(as_u64);

    let mut page = MessagePage::from_offset(items, returned, requested, total);
    if let Some(next) = object
        .get("next_cursor")
        .or_else(|| object.get("nextCursor"))
        .and_then(as_u64)
    {
        page.next_cursor = requested.advance_to(PageCursor::new(next));
    }
    if let Some(has_more) = object
        .get("has_more")
        .or_else(|| object.get("hasMore"))
        .and_then(Value::as_bool)
    {
        page.has_more = has_more && returned > 0;
    }
    Ok(page)
}

fn parse_items(items: Vec<Value>) -> Vec<Message> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Message>(item) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable message");
                None
            }
        })
        .collect()
}

/// Totals are sometimes sent as strings.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_items_and_total() {
        let body = json!({
            "total": 3349,
            "items": [
                {
                    "id": "b1e9bb83",
                    "user_id": "cd3a350e",
                    "user_name": "Sophia Al-Farsi",
                    "timestamp": "2025-05-05T07:47:20.159073+00:00",
                    "message": "Please book a private jet to Paris for this Friday."
                },
                {"id": 17, "user_name": "Armand Dupont", "message": "Table for two."}
            ]
        });

        let page = parse_page(body, PageCursor::new(100)).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].author, "Sophia Al-Farsi");
        assert_eq!(page.items[1].id.as_str(), "17");
        assert_eq!(page.total, Some(3349));
        assert_eq!(page.next_cursor, PageCursor::new(102));
        assert!(page.has_more);
    }

    #[test]
    fn test_last_page_has_no_more() {
        let body = json!({"total": "101", "items": [{"id": "x", "message": "m"}]});
        let page = parse_page(body, PageCursor::new(100)).unwrap();
        assert_eq!(page.total, Some(101));
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_items_end_paging() {
        let page = parse_page(json!({"items": []}), PageCursor::new(5)).unwrap();
        assert!(page.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, PageCursor::new(5));
    }

    #[test]
    fn test_explicit_cursor_fields_win() {
        let body = json!({
            "items": [{"id": "1", "message": "a"}],
            "next_cursor": 50,
            "has_more": false
        });
        let page = parse_page(body, PageCursor::START).unwrap();
        assert_eq!(page.next_cursor, PageCursor::new(50));
        assert!(!page.has_more);
    }

    #[test]
    fn test_bare_array_response() {
        let page = parse_page(json!([{"id": "1", "message": "a"}]), PageCursor::START).unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.total.is_none());
    }

    #[test]
    fn test_unreadable_items_are_skipped() {
        let body = json!({"items": [{"id": "1", "message": "ok"}, 42, "nope"]});
        let page = parse_page(body, PageCursor::START).unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_unreadable_items_still_advance_cursor() {
        let body = json!({
            "total": 10,
            "items": [{"id": "a", "message": "ok"}, {"id": "b", "message": 1}, 42]
        });
        let page = parse_page(body, PageCursor::START).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor, PageCursor::new(3));
        assert!(page.has_more);
    }

    #[test]
    fn test_fully_unreadable_page_keeps_paging() {
        let body = json!({"total": 10, "items": [{"id": "a", "message": 1}]});
        let page = parse_page(body, PageCursor::START).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next_cursor, PageCursor::new(1));
        assert!(page.has_more);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            parse_page(json!("oops"), PageCursor::START),
            Err(SourceError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_page(json!({"items": {}}), PageCursor::START),
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_messages_url_joins_cleanly() {
        let source =
            HttpMessageSource::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.messages_url(), "http://localhost:8000/messages/");
    }
}
