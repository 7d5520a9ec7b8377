//! Data Transfer Objects for the wire protocol.

pub mod websocket;
