//! Broadcast hub: fan-out channels plus the participant registry under one
//! lock.
//!
//! Each connection registers an unbounded sender at accept; a pusher task
//! on the socket side drains the matching receiver. The registry lives in
//! the same mutex as the senders so every roster snapshot is taken and sent
//! within a single critical section: a broadcast can never be computed
//! against a stale roster.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};

use crate::domain::{ConnectionId, ParticipantRegistry, RosterEntry};
use crate::infrastructure::dto::websocket::ServerFrame;

/// What the hub delivers to a connection's pusher task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A JSON text frame.
    Frame(String),
    /// Close the connection with the given code and reason. The pusher
    /// task stops after sending this.
    Close { code: u16, reason: &'static str },
}

/// Per-connection channel the hub pushes [`Outbound`] values into.
pub type PusherChannel = mpsc::UnboundedSender<Outbound>;

struct HubState {
    registry: ParticipantRegistry,
    senders: HashMap<ConnectionId, PusherChannel>,
}

/// Fan-out of frames to all currently open connections, and the single
/// source of truth for the roster broadcast.
pub struct ChatHub {
    state: Mutex<HubState>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                registry: ParticipantRegistry::new(),
                senders: HashMap::new(),
            }),
        }
    }

    /// Register a connection's outbound channel at accept time. The
    /// connection is not part of the roster until it joins.
    pub async fn attach(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut state = self.state.lock().await;
        state.senders.insert(connection, sender);
        tracing::debug!("connection {connection} attached to hub");
    }

    /// Register `connection` under `username` and broadcast the resulting
    /// roster to every open connection, the joiner included.
    pub async fn register_participant(&self, connection: ConnectionId, username: String) {
        let mut state = self.state.lock().await;
        state.registry.register(connection, username);
        let frame = ServerFrame::users(state.registry.snapshot()).to_json();
        Self::fan_out(&state.senders, &frame);
    }

    /// Drop `connection` from both the fan-out set and the roster, then
    /// broadcast the shrunk roster to the remaining connections. Safe to
    /// call for a connection that never joined.
    pub async fn remove(&self, connection: &ConnectionId) {
        let mut state = self.state.lock().await;
        state.senders.remove(connection);
        state.registry.unregister(connection);
        let frame = ServerFrame::users(state.registry.snapshot()).to_json();
        Self::fan_out(&state.senders, &frame);
        tracing::debug!("connection {connection} removed from hub");
    }

    /// Deliver a text frame to every open connection.
    pub async fn broadcast_to_all(&self, frame: &str) {
        let state = self.state.lock().await;
        Self::fan_out(&state.senders, frame);
    }

    /// Deliver to a single connection. Used for the history replay and for
    /// close directives; a missing or closed connection is skipped.
    pub async fn send_to(&self, connection: &ConnectionId, outbound: Outbound) {
        let state = self.state.lock().await;
        match state.senders.get(connection) {
            Some(sender) => {
                if sender.send(outbound).is_err() {
                    tracing::warn!("connection {connection} is gone, dropping frame");
                }
            }
            None => tracing::warn!("connection {connection} not attached, dropping frame"),
        }
    }

    /// Current roster snapshot, for the HTTP surface and tests.
    pub async fn snapshot(&self) -> Vec<RosterEntry> {
        self.state.lock().await.registry.snapshot()
    }

    fn fan_out(senders: &HashMap<ConnectionId, PusherChannel>, frame: &str) {
        for (connection, sender) in senders {
            // A connection mid-teardown may have dropped its receiver
            // already; skip it rather than failing the broadcast.
            if sender.send(Outbound::Frame(frame.to_string())).is_err() {
                tracing::warn!("failed to push frame to connection {connection}, skipping");
            }
        }
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn attach_peer(hub: &ChatHub) -> (ConnectionId, mpsc::UnboundedReceiver<Outbound>) {
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.attach(connection, tx).await;
        (connection, rx)
    }

    async fn recv_text(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> String {
        match rx.recv().await {
            Some(Outbound::Frame(text)) => text,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_attached_connection() {
        let hub = ChatHub::new();
        let (_a, mut rx_a) = attach_peer(&hub).await;
        let (_b, mut rx_b) = attach_peer(&hub).await;

        hub.broadcast_to_all("hello").await;

        assert_eq!(recv_text(&mut rx_a).await, "hello");
        assert_eq!(recv_text(&mut rx_b).await, "hello");
    }

    #[tokio::test]
    async fn send_to_reaches_only_the_target() {
        let hub = ChatHub::new();
        let (a, mut rx_a) = attach_peer(&hub).await;
        let (_b, mut rx_b) = attach_peer(&hub).await;

        hub.send_to(&a, Outbound::Frame("just you".to_string()))
            .await;

        assert_eq!(recv_text(&mut rx_a).await, "just you");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn register_participant_broadcasts_roster_including_joiner() {
        let hub = ChatHub::new();
        let (a, mut rx_a) = attach_peer(&hub).await;
        let (b, mut rx_b) = attach_peer(&hub).await;
        hub.register_participant(a, "Alice".to_string()).await;
        // Drain Alice's own roster broadcast.
        recv_text(&mut rx_a).await;
        recv_text(&mut rx_b).await;

        hub.register_participant(b, "Bob".to_string()).await;

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = recv_text(rx).await;
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value["type"], "users");
            let names: Vec<&str> = value["users"]
                .as_array()
                .unwrap()
                .iter()
                .map(|u| u["username"].as_str().unwrap())
                .collect();
            assert!(names.contains(&"Alice"));
            assert!(names.contains(&"Bob"));
        }
    }

    #[tokio::test]
    async fn remove_broadcasts_shrunk_roster_to_remaining() {
        let hub = ChatHub::new();
        let (a, _rx_a) = attach_peer(&hub).await;
        let (b, mut rx_b) = attach_peer(&hub).await;
        hub.register_participant(a, "Alice".to_string()).await;
        hub.register_participant(b, "Bob".to_string()).await;
        while rx_b.try_recv().is_ok() {}

        hub.remove(&a).await;

        let frame = recv_text(&mut rx_b).await;
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        let names: Vec<&str> = value["users"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bob"]);
        assert_eq!(hub.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn remove_of_never_joined_connection_still_broadcasts_roster() {
        let hub = ChatHub::new();
        let (a, _rx_a) = attach_peer(&hub).await;
        let (b, mut rx_b) = attach_peer(&hub).await;
        hub.register_participant(b, "Bob".to_string()).await;
        while rx_b.try_recv().is_ok() {}

        // `a` attached but never joined; removal must not error and still
        // notifies the rest.
        hub.remove(&a).await;

        let frame = recv_text(&mut rx_b).await;
        assert!(frame.contains("\"users\""));
        assert_eq!(hub.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn broadcast_skips_connections_with_dropped_receivers() {
        let hub = ChatHub::new();
        let (_a, rx_a) = attach_peer(&hub).await;
        let (_b, mut rx_b) = attach_peer(&hub).await;
        drop(rx_a);

        hub.broadcast_to_all("still delivered").await;

        assert_eq!(recv_text(&mut rx_b).await, "still delivered");
    }

    #[tokio::test]
    async fn send_to_unknown_connection_is_a_noop() {
        let hub = ChatHub::new();

        hub.send_to(&ConnectionId::new(), Outbound::Frame("x".to_string()))
            .await;
    }
}
