//! Alert dispatch to the configured channels.

use tracing::{error, info};

use statuswatch_config::Settings;

use crate::error::MonitorError;

use super::alert_channels::{EmailChannel, WebhookChannel};
use super::alerts::{Alert, AlertChannel};

/// Fans an alert out to every channel.
///
/// Channels are attempted in order and independently. Delivery failures are
/// logged and returned, never raised.
#[derive(Default)]
pub struct Notifier {
    channels: Vec<Box<dyn AlertChannel>>,
}

impl Notifier {
    /// Notifier with no channels; alerts are only logged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Email over SMTP, plus the chat webhook when one is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, MonitorError> {
        let mut notifier = Self::new();

        info!("Adding email alert channel");
        notifier.add_channel(Box::new(EmailChannel::smtp(&settings.email)?));

        if let Some(ref webhook_url) = settings.chat_webhook_url {
            info!("Adding webhook alert channel");
            notifier.add_channel(Box::new(WebhookChannel::new(webhook_url)));
        }

        Ok(notifier)
    }

    /// Add a channel.
    pub fn add_channel(&mut self, channel: Box<dyn AlertChannel>) {
        self.channels.push(channel);
    }

    pub fn with_channel(mut self, channel: Box<dyn AlertChannel>) -> Self {
        self.add_channel(channel);
        self
    }

    /// Get list of channel names.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send an alert to all channels, returning the failures.
    pub async fn send(&self, alert: &Alert) -> Vec<MonitorError> {
        info!(
            "[ALERT] {}: {} -> {} ({})",
            alert.target_name, alert.previous, alert.new, alert.detail
        );

        let mut errors = Vec::new();
        for channel in &self.channels {
            match channel.send(alert).await {
                Ok(()) => info!("Alert for {} sent via {}", alert.target_name, channel.name()),
                Err(e) => {
                    error!("Failed to send alert via {}: {}", channel.name(), e);
                    errors.push(e);
                }
            }
        }

        errors
    }
}
