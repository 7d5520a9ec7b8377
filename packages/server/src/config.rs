//! Process-wide configuration, immutable after startup.

/// Default number of persisted messages replayed to a new connection.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Relay configuration resolved at startup.
///
/// Collaborator handles (identity verifier, message store) are wired into
/// the use cases at startup and are not part of this struct; everything
/// here is plain policy data shared with the connection handlers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// When true, only joins carrying a verifiable identity token are
    /// accepted, and messages from unauthenticated connections are dropped.
    pub require_auth: bool,
    /// Origins allowed to connect. An empty list allows any origin.
    pub allowed_origins: Vec<String>,
    /// Maximum number of persisted messages replayed on connect.
    pub history_limit: usize,
}

impl ServerConfig {
    /// Whether a connection declaring `origin` may proceed past accept.
    ///
    /// With a non-empty allow-list, a missing origin header is rejected
    /// like a mismatched one.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
    }

    /// Parse a comma-separated origin list, dropping empty entries.
    pub fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: false,
            allowed_origins: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
