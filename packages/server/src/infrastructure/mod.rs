//! Infrastructure layer: the broadcast hub, wire DTOs, and HTTP-backed
//! implementations of the collaborator traits.

pub mod collaborator;
pub mod dto;
pub mod hub;

pub use hub::{ChatHub, Outbound, PusherChannel};
