//! Verified identity and the external identity provider boundary.

use async_trait::async_trait;
use thiserror::Error;

/// Identity resolved by the external provider from a client-supplied token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable subject identifier assigned by the provider.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl VerifiedIdentity {
    /// The display name the identity itself suggests: the profile name,
    /// falling back to the email address.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.email.as_deref())
    }
}

/// Errors from identity token verification.
///
/// Both variants mean the token could not be trusted; they are separated so
/// logs can distinguish a rejected token from an unreachable provider.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid identity token: {0}")]
    InvalidToken(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity provider boundary.
///
/// Implementations resolve a client-supplied token to a [`VerifiedIdentity`]
/// or fail with [`VerifyError`]. Calls are expected to be bounded by a
/// timeout; expiry surfaces as [`VerifyError::Unavailable`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError>;
}
