//! UseCase: connection teardown.
//!
//! Detaches the connection from the hub, removes it from the roster
//! (a no-op if it never joined), and broadcasts the shrunk roster to the
//! remaining connections.

use std::sync::Arc;

use crate::domain::ConnectionId;
use crate::infrastructure::ChatHub;

pub struct LeaveRoomUseCase {
    hub: Arc<ChatHub>,
}

impl LeaveRoomUseCase {
    pub fn new(hub: Arc<ChatHub>) -> Self {
        Self { hub }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        self.hub.remove(&connection).await;
        tracing::info!("connection {connection} left");
    }
}
