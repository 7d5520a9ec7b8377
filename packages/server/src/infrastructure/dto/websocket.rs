//! WebSocket frame DTOs (JSON text frames discriminated by `type`).

use serde::{Deserialize, Serialize};

use crate::domain::{ANONYMOUS_NAME, RosterEntry, StoredMessage};
use lounge_shared::time::format_short_time;

/// Inbound frame from a client.
///
/// A closed tagged-variant type: frames with an unrecognized `type` land on
/// [`ClientFrame::Unknown`] and are ignored by the handler, never fatal.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Join handshake: display name and optional identity token.
    Join {
        #[serde(default)]
        username: Option<String>,
        #[serde(default, rename = "idToken")]
        id_token: Option<String>,
    },
    /// A chat message. Missing `text` is tolerated as an empty message.
    Message {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

/// Outbound frame to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// One-shot replay of recent messages, oldest-first.
    History { items: Vec<HistoryItem> },
    /// A relayed chat message, broadcast to all connections.
    Message {
        username: String,
        text: String,
        timestamp: String,
    },
    /// Roster update, broadcast on every join and close.
    Users { users: Vec<UserEntry> },
}

impl ServerFrame {
    pub fn users(roster: Vec<RosterEntry>) -> Self {
        Self::Users {
            users: roster.into_iter().map(UserEntry::from).collect(),
        }
    }

    /// Serialize for transport. These frames contain only strings and
    /// booleans, so serialization cannot fail.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub username: String,
    pub text: String,
    pub timestamp: String,
}

impl From<StoredMessage> for HistoryItem {
    fn from(record: StoredMessage) -> Self {
        let username = if record.username.is_empty() {
            ANONYMOUS_NAME.to_string()
        } else {
            record.username
        };
        Self {
            username,
            text: record.text,
            timestamp: format_short_time(record.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEntry {
    pub username: String,
    pub online: bool,
}

impl From<RosterEntry> for UserEntry {
    fn from(entry: RosterEntry) -> Self {
        Self {
            username: entry.username,
            online: entry.online,
        }
    }
}
