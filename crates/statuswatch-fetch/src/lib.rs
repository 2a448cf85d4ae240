//! Page fetching for StatusWatch.
//!
//! A [`PageFetcher`] turns a URL into page text or a [`FetchError`]. Two
//! backends are provided:
//!
//! - [`BrowserFetcher`]: drives Chrome over the DevTools protocol so pages
//!   that render client-side come back fully rendered. Chrome must be
//!   started separately with `--remote-debugging-port=9222`.
//! - [`HttpFetcher`]: a plain GET, for status pages that serve static HTML.
//!
//! Neither backend retries; a failed fetch is simply reported and the next
//! polling cycle tries again.

mod browser;
mod challenge;
mod error;
mod http;

use std::sync::Arc;

use async_trait::async_trait;

use statuswatch_config::{FetchBackend, FetchSettings};

pub use browser::{BrowserFetcher, BrowserFetcherConfig, CdpClient, CdpError, PageSession};
pub use challenge::{detect_challenge, page_title};
pub use error::FetchError;
pub use http::HttpFetcher;

/// Outcome of one fetch: the page text, or why it could not be retrieved.
pub type FetchResult = Result<String, FetchError>;

/// Desktop Chrome user agent sent by both backends.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Retrieves rendered page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Fetch a page. Never panics on network or page problems; every
    /// failure is returned as a [`FetchError`].
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Build the fetcher selected by the settings.
pub fn build_fetcher(settings: &FetchSettings) -> Result<Arc<dyn PageFetcher>, FetchError> {
    Ok(match settings.backend {
        FetchBackend::Browser => Arc::new(BrowserFetcher::new(BrowserFetcherConfig::from(settings))),
        FetchBackend::Http => Arc::new(HttpFetcher::new(settings.timeout)?),
    })
}
