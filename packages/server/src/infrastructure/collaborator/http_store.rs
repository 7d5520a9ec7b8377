//! Message persistence against the backend's message endpoint.

use async_trait::async_trait;

use crate::domain::{MessageStore, StoreError, StoredMessage};

/// Appends records with `POST {base}/messages` and reads recent history
/// with `GET {base}/messages?limit=N` (the endpoint answers newest-first).
pub struct HttpMessageStore {
    client: reqwest::Client,
    messages_url: String,
}

impl HttpMessageStore {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client()?,
            messages_url: format!("{}/messages", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    async fn append(&self, record: &StoredMessage) -> Result<(), StoreError> {
        self.client
            .post(&self.messages_url)
            .json(record)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredMessage>, StoreError> {
        let records = self
            .client
            .get(&self.messages_url)
            .query(&[("limit", limit)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(records)
    }
}
