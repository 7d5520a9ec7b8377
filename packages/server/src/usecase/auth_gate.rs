//! Optional gate in front of the external identity provider.

use std::sync::Arc;

use crate::domain::{IdentityVerifier, VerifiedIdentity, VerifyError};

/// Wraps the (optional) identity provider handle.
///
/// When no provider is configured, any supplied token is unverifiable;
/// whether that fails the join open or closed is decided by the caller
/// based on the `require_auth` policy.
pub struct AuthGate {
    verifier: Option<Arc<dyn IdentityVerifier>>,
}

impl AuthGate {
    pub fn new(verifier: Option<Arc<dyn IdentityVerifier>>) -> Self {
        Self { verifier }
    }

    pub fn disabled() -> Self {
        Self { verifier: None }
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        match &self.verifier {
            Some(verifier) => verifier.verify(token).await,
            None => Err(VerifyError::Unavailable(
                "no identity provider configured".to_string(),
            )),
        }
    }
}
