//! Fetch errors.

use std::time::Duration;

use thiserror::Error;

use crate::browser::CdpError;

/// Reasons a page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The wall-clock limit was exceeded.
    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The site served an anti-automation challenge instead of the page.
    #[error("Blocked by anti-bot challenge: {0}")]
    Blocked(String),

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Network or protocol failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Browser automation failure.
    #[error("Browser error: {0}")]
    Browser(#[from] CdpError),
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = FetchError::Timeout(Duration::from_secs(45));
        assert_eq!(err.to_string(), "Timed out after 45s");
    }

    #[test]
    fn test_blocked_display() {
        let err = FetchError::Blocked("Just a moment...".to_string());
        assert!(err.to_string().contains("anti-bot"));
        assert!(err.to_string().contains("Just a moment"));
    }

    #[test]
    fn test_from_cdp_error() {
        let err: FetchError = CdpError::SessionClosed.into();
        assert!(matches!(err, FetchError::Browser(CdpError::SessionClosed)));
    }

    #[test]
    fn test_from_parse_error() {
        let err: FetchError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
