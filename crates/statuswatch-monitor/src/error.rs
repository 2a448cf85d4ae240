//! Monitor errors.

use thiserror::Error;

/// Monitor error types.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A channel accepted the alert but delivery failed.
    #[error("{channel} delivery failed: {reason}")]
    ChannelDelivery { channel: String, reason: String },

    /// Channel not configured.
    #[error("Alert channel not configured: {0}")]
    ChannelNotConfigured(String),

    /// A mailbox could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Mail transport could not be built.
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// A per-target step panicked.
    #[error("Check for {target} panicked: {message}")]
    Panicked { target: String, message: String },
}

impl MonitorError {
    pub(crate) fn delivery(channel: &str, reason: impl Into<String>) -> Self {
        MonitorError::ChannelDelivery {
            channel: channel.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_display() {
        let err = MonitorError::delivery("webhook", "HTTP 500");
        assert_eq!(err.to_string(), "webhook delivery failed: HTTP 500");
    }

    #[test]
    fn test_panicked_display() {
        let err = MonitorError::Panicked {
            target: "Roblox".to_string(),
            message: "index out of bounds".to_string(),
        };
        assert_eq!(err.to_string(), "Check for Roblox panicked: index out of bounds");
    }
}
