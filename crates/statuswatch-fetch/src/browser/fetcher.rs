//! [`PageFetcher`] backed by a shared Chrome instance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use statuswatch_config::FetchSettings;

use super::client::CdpClient;
use super::error::CdpError;
use super::session::PageSession;
use crate::challenge::detect_challenge;
use crate::error::FetchError;
use crate::{FetchResult, PageFetcher, DESKTOP_USER_AGENT};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Browser fetcher configuration.
#[derive(Debug, Clone)]
pub struct BrowserFetcherConfig {
    /// Chrome remote-debugging HTTP endpoint.
    pub endpoint: String,
    /// Wall-clock limit for one fetch, settle delay included.
    pub timeout: Duration,
    /// Bounds of the random pause after load, for client-side rendering.
    pub render_wait_min: Duration,
    pub render_wait_max: Duration,
}

impl From<&FetchSettings> for BrowserFetcherConfig {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            endpoint: settings.browser_endpoint.clone(),
            timeout: settings.timeout,
            render_wait_min: settings.render_wait_min,
            render_wait_max: settings.render_wait_max,
        }
    }
}

impl Default for BrowserFetcherConfig {
    fn default() -> Self {
        Self::from(&FetchSettings::default())
    }
}

/// Renders each page in a fresh tab of one long-lived browser.
///
/// The browser connection is established on first use and re-established
/// after it drops. Every tab is closed once its fetch finishes, whether it
/// succeeded or not.
pub struct BrowserFetcher {
    config: BrowserFetcherConfig,
    client: Mutex<Option<Arc<CdpClient>>>,
}

impl BrowserFetcher {
    pub fn new(config: BrowserFetcherConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserFetcherConfig {
        &self.config
    }

    /// Get the shared client, connecting if there is none or it has dropped.
    async fn client(&self) -> Result<Arc<CdpClient>, CdpError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref().filter(|c| c.is_connected()) {
            return Ok(client.clone());
        }

        if guard.take().is_some() {
            warn!("Browser connection lost, reconnecting to {}", self.config.endpoint);
        }
        let client = Arc::new(CdpClient::connect(&self.config.endpoint).await?);
        info!("Connected to browser at {}", self.config.endpoint);
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Drop the shared client so the next fetch reconnects.
    async fn reset(&self) {
        self.client.lock().await.take();
    }

    /// Random pause within the configured bounds.
    fn settle_delay(&self) -> Duration {
        let min = self.config.render_wait_min.as_millis() as u64;
        let max = self.config.render_wait_max.as_millis() as u64;
        if max <= min {
            return self.config.render_wait_min;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    async fn open_page(&self) -> Result<(Arc<CdpClient>, PageSession), CdpError> {
        let client = self.client().await?;
        let page = client.new_page().await?;
        Ok((client, page))
    }

    async fn render(&self, page: &PageSession, url: &str) -> FetchResult {
        page.set_user_agent(DESKTOP_USER_AGENT).await?;
        page.navigate(url).await?;

        let settle = self.settle_delay();
        debug!("Waiting {}ms for {} to render", settle.as_millis(), url);
        tokio::time::sleep(settle).await;

        let title = page.title().await?;
        if let Some(title) = detect_challenge(&title) {
            return Err(FetchError::Blocked(title));
        }

        Ok(page.content().await?)
    }

    async fn fetch_with_deadline(&self, url: &str, deadline: Instant) -> FetchResult {
        let (client, page) = match timeout_at(deadline, self.open_page()).await {
            Ok(opened) => opened?,
            Err(_) => return Err(FetchError::Timeout(self.config.timeout)),
        };

        let result = match timeout_at(deadline, self.render(&page, url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.timeout)),
        };

        close_in_background(client, page.target_id().to_string());
        result
    }
}

/// Close a tab without holding up the fetch that used it.
///
/// Bounded so a browser that never acknowledges does not pin the client.
fn close_in_background(client: Arc<CdpClient>, target_id: String) {
    tokio::spawn(async move {
        match tokio::time::timeout(CLOSE_TIMEOUT, client.close_page(&target_id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Failed to close page {}: {}", target_id, e),
            Err(_) => debug!("Timed out closing page {}", target_id),
        }
    });
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &str {
        "browser"
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        url::Url::parse(url)?;

        let deadline = Instant::now() + self.config.timeout;
        let result = self.fetch_with_deadline(url, deadline).await;

        if let Err(FetchError::Browser(ref e)) = result {
            if e.is_connection_lost() {
                self.reset().await;
            }
        }
        result
    }
}
