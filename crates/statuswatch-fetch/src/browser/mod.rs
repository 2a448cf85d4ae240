//! Chrome DevTools Protocol (CDP) backend.
//!
//! Connects over WebSocket to a Chrome started with remote debugging:
//!
//! ```bash
//! google-chrome --headless=new --remote-debugging-port=9222
//! ```

mod client;
mod error;
#[cfg(test)]
mod fake_chrome;
mod fetcher;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use fetcher::{BrowserFetcher, BrowserFetcherConfig};
pub use session::PageSession;
