//! HTTP access to the wiki.
//!
//! The crawler only needs "give me this page as text", so that is all
//! [`PageFetcher`] asks for. [`WikiClient`] is the real implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Page fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Something that can turn a URL into a page body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain GET client for wiki pages. No auth, no retries.
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
}

impl WikiClient {
    /// Create a client, optionally bounding every request by `timeout`.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for WikiClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "Fetching wiki page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
