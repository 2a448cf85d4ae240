//! CDP error types.

use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery and tab management).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the browser connection itself is gone and must be re-established.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            CdpError::ConnectionFailed(_)
                | CdpError::ChromeNotAvailable(_)
                | CdpError::WebSocket(_)
                | CdpError::SessionClosed
                | CdpError::Http(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lost_classification() {
        assert!(CdpError::SessionClosed.is_connection_lost());
        assert!(CdpError::WebSocket("reset".into()).is_connection_lost());
        assert!(!CdpError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".into()).is_connection_lost());
        assert!(!CdpError::Timeout("Page load timeout".into()).is_connection_lost());
    }

    #[test]
    fn test_protocol_display() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Cannot navigate to invalid URL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CDP error: Cannot navigate to invalid URL (code: -32000)"
        );
    }
}
