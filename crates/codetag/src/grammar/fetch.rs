//! Fetching grammar payloads.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AcquireError;

/// Per-request timeout for the HTTP fetcher.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Capability to download a grammar payload.
///
/// Implementations report every transport or status failure as
/// [`AcquireError::Network`] so the loader can retry it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquireError>;
}

/// HTTP GET over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("codetag/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquireError> {
        debug!(url, "Fetching grammar payload");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::network(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::network(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AcquireError::network(url, e.to_string()))?;

        debug!(url, bytes = bytes.len(), "Fetched grammar payload");
        Ok(bytes.to_vec())
    }
}
