//! Connection identity and the authoritative participant roster.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Opaque identity of one connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of the roster broadcast to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub username: String,
    /// Always true: the roster only ever lists live connections.
    pub online: bool,
}

/// Authoritative mapping of live connection to display name.
///
/// Entries exist only for joined connections. Display names are not unique;
/// two participants may share one. This struct does no locking of its own:
/// the hub holds it inside a single mutex together with the fan-out senders
/// so that a roster read and the following broadcast form one critical
/// section.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    entries: HashMap<ConnectionId, String>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `connection`.
    pub fn register(&mut self, connection: ConnectionId, username: String) {
        self.entries.insert(connection, username);
    }

    /// Remove the entry for `connection` if present. Closing before joining
    /// must not error, so an absent entry is a no-op.
    pub fn unregister(&mut self, connection: &ConnectionId) {
        self.entries.remove(connection);
    }

    /// Current roster, recomputed on demand. Order is unspecified; clients
    /// are responsible for display ordering.
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        self.entries
            .values()
            .map(|username| RosterEntry {
                username: username.clone(),
                online: true,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
