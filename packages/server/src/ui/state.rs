//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::infrastructure::ChatHub;
use crate::usecase::{
    JoinRoomUseCase, LeaveRoomUseCase, RelayMessageUseCase, ReplayHistoryUseCase,
};

/// Everything the connection handlers need, shared behind an `Arc`.
pub struct AppState {
    pub config: ServerConfig,
    pub hub: Arc<ChatHub>,
    pub join_room: Arc<JoinRoomUseCase>,
    pub relay_message: Arc<RelayMessageUseCase>,
    pub replay_history: Arc<ReplayHistoryUseCase>,
    pub leave_room: Arc<LeaveRoomUseCase>,
}
