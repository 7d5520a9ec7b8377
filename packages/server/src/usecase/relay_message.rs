//! UseCase: relay a chat message.
//!
//! Builds the message with a server-assigned timestamp, persists it
//! best-effort when a store is configured, and broadcasts it to every open
//! connection, the sender included. A store failure is logged and never
//! blocks the broadcast.

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageStore, Session, StoredMessage};
use crate::infrastructure::ChatHub;
use crate::infrastructure::dto::websocket::ServerFrame;
use lounge_shared::time::{Clock, format_short_time};

pub struct RelayMessageUseCase {
    hub: Arc<ChatHub>,
    store: Option<Arc<dyn MessageStore>>,
    clock: Arc<dyn Clock>,
    require_auth: bool,
}

impl RelayMessageUseCase {
    pub fn new(
        hub: Arc<ChatHub>,
        store: Option<Arc<dyn MessageStore>>,
        clock: Arc<dyn Clock>,
        require_auth: bool,
    ) -> Self {
        Self {
            hub,
            store,
            clock,
            require_auth,
        }
    }

    /// Relay `text` on behalf of `session`.
    ///
    /// Under `require_auth`, a message from a connection without a verified
    /// identity is silently dropped; no error reaches the sender.
    pub async fn execute(&self, session: &Session, text: &str) {
        if self.require_auth && !session.is_authenticated() {
            tracing::warn!(
                "dropping message from unauthenticated connection {}",
                session.id
            );
            return;
        }

        let message = ChatMessage {
            username: session.sender_name().to_string(),
            text: text.to_string(),
            sent_at_millis: self.clock.now_millis(),
            subject: session.identity.as_ref().map(|i| i.subject.clone()),
        };

        if let Some(store) = &self.store {
            let record = StoredMessage::from(&message);
            if let Err(e) = store.append(&record).await {
                tracing::error!("failed to persist message: {e}");
            }
        }

        let frame = ServerFrame::Message {
            username: message.username,
            text: message.text,
            timestamp: format_short_time(message.sent_at_millis),
        };
        self.hub.broadcast_to_all(&frame.to_json()).await;
    }
}
