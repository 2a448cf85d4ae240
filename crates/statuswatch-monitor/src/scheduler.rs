//! The polling loop.
//!
//! Targets are checked strictly one at a time in registry order:
//!
//! ```text
//! for each target: fetch -> classify -> evaluate -> (alert) -> check delay
//! loop delay, repeat
//! ```
//!
//! Cancellation is checked at every target and cycle boundary, and both
//! delays wake early when the token fires. An in-flight fetch is not
//! interrupted.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use statuswatch_config::{ScheduleSettings, Target, TargetRegistry};
use statuswatch_fetch::PageFetcher;

use crate::classifier::classify;
use crate::detector::{evaluate, MonitorState};
use crate::error::MonitorError;
use crate::notifier::Notifier;
use crate::verdict::{Classification, StatusVerdict};

/// Result of checking one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCheck {
    pub name: String,
    pub classification: Classification,
    /// Whether this check produced an alert.
    pub alerted: bool,
}

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checks: Vec<TargetCheck>,
    /// Alerts handed to the notifier.
    pub alerts: usize,
    /// Channel deliveries that failed.
    pub delivery_failures: usize,
    /// Targets whose check panicked.
    pub faults: usize,
    /// Whether the cycle stopped early on cancellation.
    pub cancelled: bool,
}

impl CycleReport {
    /// Number of checks that ended in `verdict`.
    pub fn count(&self, verdict: StatusVerdict) -> usize {
        self.checks
            .iter()
            .filter(|c| c.classification.verdict == verdict)
            .count()
    }
}

/// Drives fetch, classification, change detection and notification.
pub struct Monitor {
    registry: TargetRegistry,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Notifier,
    schedule: ScheduleSettings,
}

impl Monitor {
    pub fn new(
        registry: TargetRegistry,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Notifier,
        schedule: ScheduleSettings,
    ) -> Self {
        Self {
            registry,
            fetcher,
            notifier,
            schedule,
        }
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Run until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> MonitorState {
        self.run_cycles(None, cancel).await
    }

    /// Run `cycles` cycles, or until cancelled when `None`.
    ///
    /// The loop delay is skipped after the final cycle.
    pub async fn run_cycles(&self, cycles: Option<u64>, cancel: CancellationToken) -> MonitorState {
        let mut state = MonitorState::new();
        let mut completed = 0u64;

        while !cancel.is_cancelled() && cycles.is_none_or(|n| completed < n) {
            info!("--- Check cycle {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));
            let report = self.run_cycle(&mut state, &cancel).await;
            completed += 1;

            if report.cancelled || cycles.is_some_and(|n| completed >= n) {
                break;
            }

            info!("Waiting {}s until next cycle", self.schedule.loop_delay.as_secs());
            if sleep_or_cancel(self.schedule.loop_delay, &cancel).await {
                break;
            }
        }

        info!("Monitor stopped after {} cycle(s)", completed);
        state
    }

    /// One pass over every target in registry order.
    pub async fn run_cycle(
        &self,
        state: &mut MonitorState,
        cancel: &CancellationToken,
    ) -> CycleReport {
        let mut report = CycleReport::default();

        for target in &self.registry {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let outcome = AssertUnwindSafe(self.check_target(target, state))
                .catch_unwind()
                .await;

            match outcome {
                Ok((check, failures)) => {
                    if check.alerted {
                        report.alerts += 1;
                    }
                    report.delivery_failures += failures;
                    report.checks.push(check);
                }
                Err(payload) => {
                    let err = MonitorError::Panicked {
                        target: target.name.clone(),
                        message: panic_message(payload.as_ref()),
                    };
                    error!("{}", err);
                    report.faults += 1;
                }
            }

            if sleep_or_cancel(self.schedule.check_delay, cancel).await {
                report.cancelled = true;
                break;
            }
        }

        info!(
            "Cycle complete: {} OK, {} DEGRADED, {} UNKNOWN, {} alert(s), {} failed deliveries",
            report.count(StatusVerdict::Ok),
            report.count(StatusVerdict::Degraded),
            report.count(StatusVerdict::Unknown),
            report.alerts,
            report.delivery_failures
        );
        report
    }

    /// Check one target. Returns the check and the number of failed deliveries.
    async fn check_target(&self, target: &Target, state: &mut MonitorState) -> (TargetCheck, usize) {
        debug!("Checking {} ({}) via {}", target.name, target.url, self.fetcher.name());

        let fetched = self.fetcher.fetch(&target.url).await;
        if let Err(ref e) = fetched {
            warn!("Fetch failed for {}: {}", target.name, e);
        }

        let classification = classify(target, &fetched);
        match classification.verdict {
            StatusVerdict::Ok => info!("{}: [OK] {}", target.name, classification.detail),
            verdict => warn!("{}: [{}] {}", target.name, verdict, classification.detail),
        }

        let mut failures = 0;
        let alert = evaluate(target, &classification, state);
        if let Some(ref alert) = alert {
            info!("Status change for {}: {} -> {}", target.name, alert.previous, alert.new);
            failures = self.notifier.send(alert).await.len();
        }

        let check = TargetCheck {
            name: target.name.clone(),
            classification,
            alerted: alert.is_some(),
        };
        (check, failures)
    }
}

/// Sleep for `duration`. Returns `true` if cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
