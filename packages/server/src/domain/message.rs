//! Chat message entity and the durable message store boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A chat message as relayed to connections.
///
/// Immutable once created; `sent_at_millis` is server-assigned at receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
    /// Unix milliseconds (UTC) at receipt.
    pub sent_at_millis: i64,
    /// Verified subject of the sender, when known.
    pub subject: Option<String>,
}

/// A message record as persisted by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Verified subject of the sender, when known.
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
    /// Unix milliseconds (UTC).
    pub created_at: i64,
}

impl From<&ChatMessage> for StoredMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            subject: message.subject.clone(),
            username: message.username.clone(),
            text: message.text.clone(),
            created_at: message.sent_at_millis,
        }
    }
}

/// Errors from the durable message store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// External durable message store boundary.
///
/// The store is append-only; records are never updated in place. All
/// failures are absorbed by the callers (logged, never surfaced to the
/// client), so history and persistence stay a convenience rather than a
/// correctness requirement.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one record. Fire-and-forget from the relay's perspective.
    async fn append(&self, record: &StoredMessage) -> Result<(), StoreError>;

    /// The most recent records, newest-first, at most `limit` of them.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_message_carries_over_all_fields() {
        let message = ChatMessage {
            username: "Alice".to_string(),
            text: "hello".to_string(),
            sent_at_millis: 1000,
            subject: Some("uid-1".to_string()),
        };

        let record = StoredMessage::from(&message);

        assert_eq!(record.username, "Alice");
        assert_eq!(record.text, "hello");
        assert_eq!(record.created_at, 1000);
        assert_eq!(record.subject.as_deref(), Some("uid-1"));
    }

    #[test]
    fn stored_message_deserializes_with_missing_optional_fields() {
        let record: StoredMessage =
            serde_json::from_str(r#"{"created_at": 42}"#).expect("record should parse");

        assert_eq!(record.subject, None);
        assert_eq!(record.username, "");
        assert_eq!(record.text, "");
        assert_eq!(record.created_at, 42);
    }
}
