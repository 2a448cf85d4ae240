//! # StatusWatch Monitor
//!
//! The status polling and alerting loop.
//!
//! ## Pipeline
//!
//! - [`classify`] turns fetched page text into a [`Classification`]
//! - [`evaluate`] compares it with the last verdict in [`MonitorState`]
//! - [`Notifier`] delivers any resulting [`Alert`] by email and chat webhook
//! - [`Monitor`] drives the above over the registry until cancelled

pub mod alert_channels;
pub mod alerts;
pub mod classifier;
pub mod detector;
pub mod error;
pub mod notifier;
pub mod scheduler;
pub mod verdict;

pub use alert_channels::{Email, EmailChannel, MailTransport, SmtpMailer, WebhookChannel};
pub use alerts::{Alert, AlertChannel, AlertSeverity};
pub use classifier::classify;
pub use detector::{evaluate, MonitorState};
pub use error::MonitorError;
pub use notifier::Notifier;
pub use scheduler::{CycleReport, Monitor, TargetCheck};
pub use verdict::{Classification, StatusVerdict};

// Re-export CancellationToken for callers driving the loop
pub use tokio_util::sync::CancellationToken;
