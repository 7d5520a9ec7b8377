//! Identity verification against the backend's token endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::{IdentityVerifier, VerifiedIdentity, VerifyError};

/// Verifies identity tokens by POSTing them to `{base}/verify`.
///
/// The endpoint answers `200` with the resolved identity, or `401`/`403`
/// for a token it rejects. Anything else (including a timeout) surfaces as
/// [`VerifyError::Unavailable`].
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    verify_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    subject: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl HttpIdentityVerifier {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client()?,
            verify_url: format!("{}/verify", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(VerifyError::InvalidToken(
                "provider rejected the token".to_string(),
            ));
        }

        let body: VerifyResponse = response
            .error_for_status()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        Ok(VerifiedIdentity {
            subject: body.subject,
            email: body.email,
            name: body.name,
        })
    }
}
