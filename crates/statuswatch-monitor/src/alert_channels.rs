//! Alert channel implementations (chat webhook, email).

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use statuswatch_config::EmailSettings;

use crate::error::MonitorError;

use super::alerts::{Alert, AlertChannel};

/// Upper bound for one delivery attempt.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Port that uses STARTTLS instead of implicit TLS.
const SUBMISSION_STARTTLS_PORT: u16 = 587;

/// Slack-compatible incoming webhook channel.
pub struct WebhookChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a new webhook channel.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            webhook_url: webhook_url.into(),
            client,
        }
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        let payload = serde_json::json!({ "text": alert.format_chat() });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::delivery(self.name(), format!("request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("Webhook alert sent for {}", alert.target_name);
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(MonitorError::delivery(
                self.name(),
                format!("webhook returned {}: {}", status, body),
            ))
        }
    }
}

/// A rendered email ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Outbound mail submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn submit(&self, email: &Email) -> Result<(), MonitorError>;
}

/// Authenticated SMTP submission over TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a mailer for the configured server. Port 587 uses STARTTLS,
    /// every other port implicit TLS.
    pub fn new(settings: &EmailSettings) -> Result<Self, MonitorError> {
        let builder = if settings.smtp_port == SUBMISSION_STARTTLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
        }
        .map_err(|e| MonitorError::Transport(format!("{}: {}", settings.smtp_host, e)))?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(DELIVERY_TIMEOUT))
            .build();

        Ok(Self { transport })
    }

    fn build_message(email: &Email) -> Result<Message, MonitorError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&email.from)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &email.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(email.body.clone())
            .map_err(|e| MonitorError::delivery("email", e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn submit(&self, email: &Email) -> Result<(), MonitorError> {
        let message = Self::build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MonitorError::delivery("email", format!("SMTP error: {}", e)))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MonitorError> {
    address
        .parse()
        .map_err(|_| MonitorError::InvalidAddress(address.to_string()))
}

/// Email channel: one message addressed to every recipient.
pub struct EmailChannel {
    sender: String,
    recipients: Vec<String>,
    transport: Box<dyn MailTransport>,
}

impl EmailChannel {
    /// Create a new email channel over the given transport.
    pub fn new(
        sender: impl Into<String>,
        recipients: Vec<String>,
        transport: Box<dyn MailTransport>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipients,
            transport,
        }
    }

    /// Email channel submitting over SMTP with the configured credentials.
    pub fn smtp(settings: &EmailSettings) -> Result<Self, MonitorError> {
        Ok(Self::new(
            settings.sender.clone(),
            settings.recipients.clone(),
            Box::new(SmtpMailer::new(settings)?),
        ))
    }

    /// Render the email for `alert`.
    pub fn compose(&self, alert: &Alert) -> Email {
        Email {
            from: self.sender.clone(),
            to: self.recipients.clone(),
            subject: alert.subject(),
            body: alert.format_text(),
        }
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        if self.recipients.is_empty() {
            return Err(MonitorError::ChannelNotConfigured(
                "email has no recipients".to_string(),
            ));
        }

        self.transport.submit(&self.compose(alert)).await?;
        debug!("Email alert sent to {} recipients", self.recipients.len());
        Ok(())
    }
}

#[cfg(test)]
#[path = "alert_channels_tests.rs"]
mod tests;
