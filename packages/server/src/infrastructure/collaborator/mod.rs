//! HTTP-backed implementations of the external collaborator traits.
//!
//! Both talk to the same backend service and are enabled as a unit: either
//! a backend URL is configured and the relay gets identity verification
//! plus persistence/history, or neither.

mod http_store;
mod http_verifier;

pub use http_store::HttpMessageStore;
pub use http_verifier::HttpIdentityVerifier;

use std::time::Duration;

/// Bound on every collaborator call. Expiry is treated identically to a
/// verification/store failure.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}
