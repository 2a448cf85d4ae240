//! Plain HTTP page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::challenge::{detect_challenge, page_title};
use crate::error::FetchError;
use crate::{FetchResult, PageFetcher, DESKTOP_USER_AGENT};

/// Fetches pages with a single GET request. Does not run JavaScript.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DESKTOP_USER_AGENT)
            .build()
            .map_err(|e| FetchError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        let url = url::Url::parse(url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if let Some(title) = page_title(&body).and_then(|t| detect_challenge(&t)) {
            return Err(FetchError::Blocked(title));
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
