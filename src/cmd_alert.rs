//! `test-alert` command.

use tracing::info;

use statuswatch_monitor::{Alert, Notifier, StatusVerdict};

use crate::config::{load_settings, report};

/// Send a synthetic alert through every configured channel.
///
/// Fails if any channel fails.
pub(crate) async fn test_alert() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings().inspect_err(report)?;
    let notifier = Notifier::from_settings(&settings)?;

    let alert = test_alert_message();
    info!("Sending test alert via {}", notifier.channel_names().join(", "));

    let errors = notifier.send(&alert).await;
    if errors.is_empty() {
        println!("Test alert delivered via {}", notifier.channel_names().join(", "));
        Ok(())
    } else {
        let failures: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(format!("Test alert failed: {}", failures.join("; ")).into())
    }
}

fn test_alert_message() -> Alert {
    Alert::new(
        "StatusWatch Test",
        "https://github.com/",
        StatusVerdict::Ok,
        StatusVerdict::Degraded,
        "This is a test alert. No action is required.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_renders() {
        let alert = test_alert_message();
        assert_eq!(alert.subject(), "ALERT: StatusWatch Test is DEGRADED");
        assert!(alert.format_chat().contains("test alert"));
    }
}
