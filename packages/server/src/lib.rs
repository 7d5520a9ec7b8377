//! Single-room WebSocket chat relay.
//!
//! Clients connect over a persistent WebSocket, announce a display name with
//! a `join` frame (optionally backed by an identity token), exchange text
//! messages, and observe a live roster of connected participants. Recent
//! history is replayed to new connections when a message store is configured.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
