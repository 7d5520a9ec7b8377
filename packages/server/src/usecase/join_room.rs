//! UseCase: join handshake.
//!
//! Validates the optional identity token against the auth policy, resolves
//! the display name, registers the connection in the roster, and triggers
//! the roster broadcast. On rejection the session is left untouched and the
//! caller closes the connection with the rejection's close code.

use std::sync::Arc;

use crate::domain::{Session, SessionState, resolve_display_name};
use crate::infrastructure::ChatHub;

use super::auth_gate::AuthGate;
use super::error::JoinRejection;

pub struct JoinRoomUseCase {
    hub: Arc<ChatHub>,
    auth_gate: AuthGate,
    require_auth: bool,
}

impl JoinRoomUseCase {
    pub fn new(hub: Arc<ChatHub>, auth_gate: AuthGate, require_auth: bool) -> Self {
        Self {
            hub,
            auth_gate,
            require_auth,
        }
    }

    /// Execute the join handshake for `session`.
    ///
    /// On success the session is `Joined` under the resolved display name
    /// and every open connection (the joiner included) has been sent the
    /// updated roster.
    pub async fn execute(
        &self,
        session: &mut Session,
        provided_name: &str,
        token: Option<&str>,
    ) -> Result<(), JoinRejection> {
        if self.require_auth && token.is_none() {
            tracing::warn!("join without token rejected, auth is required");
            return Err(JoinRejection::AuthRequired);
        }

        if let Some(token) = token {
            match self.auth_gate.verify(token).await {
                Ok(identity) => {
                    tracing::debug!("token verified for subject '{}'", identity.subject);
                    session.identity = Some(identity);
                }
                Err(e) => {
                    tracing::warn!("identity token rejected: {e}");
                    if self.require_auth {
                        return Err(JoinRejection::InvalidToken);
                    }
                    // Permissive mode: proceed unauthenticated.
                }
            }
        }

        let username = resolve_display_name(provided_name, session.identity.as_ref());
        session.username = Some(username.clone());
        session.state = SessionState::Joined;
        self.hub.register_participant(session.id, username).await;

        Ok(())
    }
}
