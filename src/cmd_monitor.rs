//! `run` and `check` commands.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use statuswatch_config::{FetchSettings, ScheduleSettings, Settings, TargetRegistry};
use statuswatch_fetch::build_fetcher;
use statuswatch_monitor::{Monitor, MonitorState, Notifier, StatusVerdict};

use crate::config::{both, load_registry, load_settings};
use crate::signal::SignalHandler;

/// How long an in-flight check may continue after a shutdown request.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Run the monitoring loop until a shutdown signal or `cycles` cycles.
pub(crate) async fn run(
    targets: Option<&Path>,
    cycles: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, registry) = both(load_settings(), load_registry(targets))?;

    log_banner(&settings, &registry);

    let fetcher = build_fetcher(&settings.fetch)?;
    let notifier = Notifier::from_settings(&settings)?;
    info!("Alert channels: {}", notifier.channel_names().join(", "));

    let monitor = Monitor::new(registry, fetcher, notifier, settings.schedule);

    let signals = SignalHandler::new();
    signals.setup_os_signals()?;

    let state = tokio::select! {
        state = monitor.run_cycles(cycles, signals.token()) => Some(state),
        _ = abandon_after_grace(&signals) => None,
    };

    match state {
        Some(state) => info!("Shutdown complete ({} targets tracked)", state.len()),
        None => warn!("Abandoned in-flight check after {}s", SHUTDOWN_GRACE.as_secs()),
    }
    Ok(())
}

/// Resolves once shutdown was requested and the grace period has passed.
async fn abandon_after_grace(signals: &SignalHandler) {
    signals.token().cancelled().await;
    tokio::time::sleep(SHUTDOWN_GRACE).await;
}

/// Fetch and classify every target once and print the verdicts.
///
/// Needs no email settings and sends nothing.
pub(crate) async fn check(targets: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (registry, (schedule, fetch)) = both(
        load_registry(targets),
        both(ScheduleSettings::from_env(), FetchSettings::from_env()),
    )?;

    let fetcher = build_fetcher(&fetch)?;
    info!("Checking {} targets via {} backend", registry.len(), fetcher.name());

    let monitor = Monitor::new(registry, fetcher, Notifier::new(), schedule);
    let signals = SignalHandler::new();
    signals.setup_os_signals()?;

    let mut state = MonitorState::new();
    let report = monitor.run_cycle(&mut state, &signals.token()).await;

    for check in &report.checks {
        let marker = match check.classification.verdict {
            StatusVerdict::Ok => "\u{2705}",
            StatusVerdict::Degraded => "\u{1f6a8}",
            StatusVerdict::Unknown => "\u{2753}",
        };
        println!(
            "{} {:<24} {:<9} {}",
            marker, check.name, check.classification.verdict, check.classification.detail
        );
    }
    if report.faults > 0 {
        println!("{} target(s) failed with an internal error, see log", report.faults);
    }

    Ok(())
}

fn log_banner(settings: &Settings, registry: &TargetRegistry) {
    let chat = if settings.chat_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    info!("StatusWatch v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Monitoring {} targets", registry.len());
    info!("Email recipients: {}", settings.email.recipients.len());
    info!("Chat webhook: {}", chat);
    info!(
        "Check delay: {}s | Loop delay: {}s",
        settings.schedule.check_delay.as_secs(),
        settings.schedule.loop_delay.as_secs()
    );
    info!(
        "Fetch backend: {} (timeout {}s)",
        settings.fetch.backend,
        settings.fetch.timeout.as_secs()
    );
}
