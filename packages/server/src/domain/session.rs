//! Per-connection session record and display name resolution.

use super::identity::VerifiedIdentity;
use super::roster::ConnectionId;

/// Display name used when neither the client nor the identity provider
/// supplied one.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Lifecycle of a connection.
///
/// A connection enters `AwaitingJoin` once the origin gate passed, moves to
/// `Joined` on a successful join handshake, and ends in the terminal
/// `Closed` state when the underlying channel goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingJoin,
    Joined,
    Closed,
}

/// Mutable per-connection state owned by the socket handler.
#[derive(Debug)]
pub struct Session {
    pub id: ConnectionId,
    pub state: SessionState,
    /// Display name registered at join. `None` until joined.
    pub username: Option<String>,
    /// Identity resolved by the provider, when a token verified.
    pub identity: Option<VerifiedIdentity>,
}

impl Session {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::AwaitingJoin,
            username: None,
            identity: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Name attributed to this connection's messages. Pre-join messages are
    /// attributed to the anonymous fallback.
    pub fn sender_name(&self) -> &str {
        self.username.as_deref().unwrap_or(ANONYMOUS_NAME)
    }
}

/// Resolve the display name registered at join.
///
/// Precedence: the trimmed client-provided name, then the verified
/// identity's name or email, then [`ANONYMOUS_NAME`].
pub fn resolve_display_name(provided: &str, identity: Option<&VerifiedIdentity>) -> String {
    let provided = provided.trim();
    if !provided.is_empty() {
        return provided.to_string();
    }
    identity
        .and_then(VerifiedIdentity::display_name)
        .unwrap_or(ANONYMOUS_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_named(name: Option<&str>, email: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            subject: "uid-1".to_string(),
            email: email.map(str::to_owned),
            name: name.map(str::to_owned),
        }
    }

    #[test]
    fn provided_name_wins_over_verified_name() {
        let identity = identity_named(Some("Bob"), None);

        assert_eq!(resolve_display_name("Alice", Some(&identity)), "Alice");
    }

    #[test]
    fn verified_name_used_when_provided_name_is_blank() {
        let identity = identity_named(Some("Bob"), Some("bob@example.com"));

        assert_eq!(resolve_display_name("   ", Some(&identity)), "Bob");
    }

    #[test]
    fn verified_email_used_when_identity_has_no_name() {
        let identity = identity_named(None, Some("bob@example.com"));

        assert_eq!(
            resolve_display_name("", Some(&identity)),
            "bob@example.com"
        );
    }

    #[test]
    fn anonymous_when_nothing_is_available() {
        assert_eq!(resolve_display_name("", None), ANONYMOUS_NAME);
        assert_eq!(resolve_display_name("  ", None), ANONYMOUS_NAME);
    }

    #[test]
    fn provided_name_is_trimmed() {
        assert_eq!(resolve_display_name("  Alice  ", None), "Alice");
    }

    #[test]
    fn new_session_awaits_join_and_is_anonymous() {
        let session = Session::new(ConnectionId::new());

        assert_eq!(session.state, SessionState::AwaitingJoin);
        assert!(!session.is_authenticated());
        assert_eq!(session.sender_name(), ANONYMOUS_NAME);
    }
}
