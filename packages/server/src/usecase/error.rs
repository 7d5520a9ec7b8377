//! Connection-fatal rejections and their close codes.
//!
//! Storage and history failures never appear here: they are absorbed where
//! they happen (logged, feature degraded). Only origin and identity
//! violations may terminate a connection.

use thiserror::Error;

/// Close code for a connection whose origin is not in the allow-list
/// (standard "policy violation" code).
pub const CLOSE_ORIGIN_NOT_ALLOWED: u16 = 1008;

/// Why a join handshake was refused. Terminates the connection with a
/// distinguishing close code; the session never reaches `Joined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinRejection {
    /// `require_auth` is set and the join carried no identity token.
    #[error("auth required")]
    AuthRequired,
    /// `require_auth` is set and the supplied token failed verification.
    #[error("invalid token")]
    InvalidToken,
}

impl JoinRejection {
    pub fn close_code(&self) -> u16 {
        match self {
            JoinRejection::AuthRequired => 4001,
            JoinRejection::InvalidToken => 4003,
        }
    }

    pub fn close_reason(&self) -> &'static str {
        match self {
            JoinRejection::AuthRequired => "Auth required",
            JoinRejection::InvalidToken => "Invalid token",
        }
    }
}
