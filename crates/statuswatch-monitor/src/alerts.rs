//! Alert types and core trait definitions.

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::verdict::StatusVerdict;

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Service recovered.
    Info,
    /// Status could not be determined.
    Warning,
    /// Service degraded.
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl AlertSeverity {
    /// Severity of a transition into `verdict`.
    pub fn for_verdict(verdict: StatusVerdict) -> Self {
        match verdict {
            StatusVerdict::Ok => AlertSeverity::Info,
            StatusVerdict::Unknown => AlertSeverity::Warning,
            StatusVerdict::Degraded => AlertSeverity::Critical,
        }
    }

    /// Get emoji for severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "\u{2705}",
            AlertSeverity::Warning => "\u{26a0}\u{fe0f}",
            AlertSeverity::Critical => "\u{1f6a8}",
        }
    }
}

/// A reportable status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub target_name: String,
    /// Status page link.
    pub url: String,
    pub previous: StatusVerdict,
    pub new: StatusVerdict,
    pub timestamp: DateTime<Utc>,
    /// Why the new verdict was reached.
    pub detail: String,
}

impl Alert {
    /// Create an alert stamped with the current time.
    pub fn new(
        target_name: impl Into<String>,
        url: impl Into<String>,
        previous: StatusVerdict,
        new: StatusVerdict,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            url: url.into(),
            previous,
            new,
            timestamp: Utc::now(),
            detail: detail.into(),
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        AlertSeverity::for_verdict(self.new)
    }

    /// Email subject line.
    pub fn subject(&self) -> String {
        format!("ALERT: {} is {}", self.target_name, self.new)
    }

    /// Plain-text body, used for email.
    pub fn format_text(&self) -> String {
        let mut text = format!(
            "Monitor Alert!\n\n\
             Site: {}\n\
             Previous Status: {}\n\
             New Status: {}\n\
             Link: {}\n\
             Time: {}",
            self.target_name,
            self.previous,
            self.new,
            self.url,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        if !self.detail.is_empty() {
            text.push_str(&format!("\n\nDetails: {}", self.detail));
        }

        text
    }

    /// Slack mrkdwn message, used for the chat webhook.
    pub fn format_chat(&self) -> String {
        let mut text = format!(
            "{} *Monitor Alert: {}*\n*Status:* {} \u{2192} {}\n<{}|View Status Page>",
            self.severity().emoji(),
            self.target_name,
            self.previous,
            self.new,
            self.url
        );

        if !self.detail.is_empty() {
            text.push_str(&format!("\n_{}_", self.detail));
        }

        text
    }
}

/// Alert channel trait.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel name.
    fn name(&self) -> &str;

    /// Send an alert.
    async fn send(&self, alert: &Alert) -> Result<(), MonitorError>;
}
