//! HTTP(S) fetching via `reqwest`.

use super::Fetch;
use crate::{ChipwaveError, Result};

/// Fetches samples over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher around a configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChipwaveError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChipwaveError::Network(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChipwaveError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
