//! Use cases: one per session-level operation.
//!
//! The socket handler drives these; they compose the hub with the
//! collaborator traits and hold all the join/relay policy.

mod auth_gate;
mod error;
mod join_room;
mod leave_room;
mod relay_message;
mod replay_history;

pub use auth_gate::AuthGate;
pub use error::{CLOSE_ORIGIN_NOT_ALLOWED, JoinRejection};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_message::RelayMessageUseCase;
pub use replay_history::ReplayHistoryUseCase;
