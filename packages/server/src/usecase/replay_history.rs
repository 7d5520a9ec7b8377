//! UseCase: one-shot history replay for a new connection.
//!
//! Fetches the most recent persisted messages (newest-first at the store),
//! reverses them to oldest-first, and delivers them to the single new
//! connection. Any store error degrades to no replay with a logged
//! warning; history is a convenience, not a correctness requirement.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessageStore};
use crate::infrastructure::dto::websocket::{HistoryItem, ServerFrame};
use crate::infrastructure::{ChatHub, Outbound};

pub struct ReplayHistoryUseCase {
    hub: Arc<ChatHub>,
    store: Option<Arc<dyn MessageStore>>,
    limit: usize,
}

impl ReplayHistoryUseCase {
    pub fn new(hub: Arc<ChatHub>, store: Option<Arc<dyn MessageStore>>, limit: usize) -> Self {
        Self { hub, store, limit }
    }

    /// Send the history frame to `connection`. Called once per connection,
    /// right after accept.
    pub async fn execute(&self, connection: ConnectionId) {
        let Some(store) = &self.store else {
            return;
        };

        let mut records = match store.recent(self.limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("history unavailable, skipping replay: {e}");
                return;
            }
        };

        // The store answers newest-first and is trusted to honor the limit,
        // but a misbehaving backend must not blow up the replay.
        records.truncate(self.limit);
        records.reverse();

        let items: Vec<HistoryItem> = records.into_iter().map(HistoryItem::from).collect();
        let count = items.len();
        let frame = ServerFrame::History { items };
        self.hub
            .send_to(&connection, Outbound::Frame(frame.to_json()))
            .await;
        tracing::debug!("replayed {count} messages to connection {connection}");
    }
}
