//! Shared utilities for the lounge chat relay.
//!
//! Small pieces used by both the server and its tests: logging setup and
//! the clock abstraction with wall-clock formatting helpers.

pub mod logger;
pub mod time;
