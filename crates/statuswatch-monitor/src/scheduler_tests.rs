use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use statuswatch_fetch::{FetchError, FetchResult};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::alert_channels::{EmailChannel, MockMailTransport, WebhookChannel};
use crate::alerts::{Alert, AlertChannel};

/// Serves queued pages per URL; the last page repeats once the queue drains.
#[derive(Default)]
struct ScriptedFetcher {
    pages: Mutex<HashMap<String, VecDeque<String>>>,
    panic_on: Option<String>,
}

impl ScriptedFetcher {
    fn with_pages(url: &str, pages: &[&str]) -> Self {
        let fetcher = Self::default();
        fetcher.script(url, pages);
        fetcher
    }

    fn script(&self, url: &str, pages: &[&str]) {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        if self.panic_on.as_deref() == Some(url) {
            panic!("parser blew up on {}", url);
        }

        let mut pages = self.pages.lock().unwrap();
        let queue = pages
            .get_mut(url)
            .ok_or_else(|| FetchError::Request("connection refused".to_string()))?;
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            queue.front().cloned().ok_or(FetchError::Status(404))
        }
    }
}

#[derive(Clone, Default)]
struct RecordingChannel {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

const API_URL: &str = "https://status.example.com/";

fn no_delays() -> ScheduleSettings {
    ScheduleSettings {
        check_delay: Duration::ZERO,
        loop_delay: Duration::ZERO,
    }
}

fn api_registry() -> TargetRegistry {
    TargetRegistry::new(vec![Target::generic("API", API_URL, ["operational"])])
}

fn monitor(registry: TargetRegistry, fetcher: ScriptedFetcher, notifier: Notifier) -> Monitor {
    Monitor::new(registry, Arc::new(fetcher), notifier, no_delays())
}

#[tokio::test]
async fn test_alerts_only_on_transitions() {
    let fetcher = ScriptedFetcher::with_pages(
        API_URL,
        &["operational", "operational", "outage", "outage", "operational"],
    );
    let channel = RecordingChannel::default();
    let monitor = monitor(
        api_registry(),
        fetcher,
        Notifier::new().with_channel(Box::new(channel.clone())),
    );

    let state = monitor.run_cycles(Some(5), CancellationToken::new()).await;

    let alerts = channel.alerts.lock().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!((alerts[0].previous, alerts[0].new), (StatusVerdict::Ok, StatusVerdict::Degraded));
    assert_eq!((alerts[1].previous, alerts[1].new), (StatusVerdict::Degraded, StatusVerdict::Ok));
    assert_eq!(state.get("API"), Some(StatusVerdict::Ok));
}

#[tokio::test]
async fn test_zero_cycles_checks_nothing() {
    let fetcher = ScriptedFetcher::with_pages(API_URL, &["outage"]);
    let channel = RecordingChannel::default();
    let monitor = monitor(
        api_registry(),
        fetcher,
        Notifier::new().with_channel(Box::new(channel.clone())),
    );

    let state = monitor.run_cycles(Some(0), CancellationToken::new()).await;

    assert!(state.is_empty());
    assert!(channel.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_report_counts() {
    let registry = TargetRegistry::new(vec![
        Target::generic("API", API_URL, ["operational"]),
        Target::downdetector("Roblox", "https://downdetector.com/status/roblox/"),
        Target::generic("Docs", "https://docs.example.com/status", ["up"]),
    ]);
    let fetcher = ScriptedFetcher::with_pages(API_URL, &["All Systems Operational"]);
    fetcher.script(
        "https://downdetector.com/status/roblox/",
        &["User reports indicate possible problems at Roblox"],
    );
    let monitor = monitor(registry, fetcher, Notifier::new());

    let mut state = MonitorState::new();
    let report = monitor.run_cycle(&mut state, &CancellationToken::new()).await;

    assert_eq!(report.checks.len(), 3);
    assert_eq!(report.count(StatusVerdict::Ok), 1);
    assert_eq!(report.count(StatusVerdict::Degraded), 1);
    assert_eq!(report.count(StatusVerdict::Unknown), 1);
    assert_eq!(report.alerts, 0);
    assert_eq!(state.len(), 3);
}

#[tokio::test]
async fn test_checks_follow_registry_order() {
    let registry = TargetRegistry::new(vec![
        Target::downdetector("B", "https://downdetector.com/status/b/"),
        Target::downdetector("A", "https://downdetector.com/status/a/"),
    ]);
    let monitor = monitor(registry, ScriptedFetcher::default(), Notifier::new());

    let report = monitor
        .run_cycle(&mut MonitorState::new(), &CancellationToken::new())
        .await;

    let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[tokio::test]
async fn test_failing_webhook_does_not_block_email() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut transport = MockMailTransport::new();
    transport.expect_submit().times(1).returning(|_| Ok(()));

    let notifier = Notifier::new()
        .with_channel(Box::new(WebhookChannel::new(mock_server.uri())))
        .with_channel(Box::new(EmailChannel::new(
            "alerts@example.com",
            vec!["ops@example.com".to_string()],
            Box::new(transport),
        )));
    let fetcher = ScriptedFetcher::with_pages(API_URL, &["operational", "outage", "outage"]);
    let monitor = monitor(api_registry(), fetcher, notifier);

    let mut state = MonitorState::new();
    let cancel = CancellationToken::new();
    monitor.run_cycle(&mut state, &cancel).await;
    let report = monitor.run_cycle(&mut state, &cancel).await;
    assert_eq!(report.alerts, 1);
    assert_eq!(report.delivery_failures, 1);

    // The loop keeps going after the failed delivery.
    let report = monitor.run_cycle(&mut state, &cancel).await;
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.alerts, 0);
}

#[tokio::test]
async fn test_fetch_failure_recorded_as_unknown() {
    let monitor = monitor(api_registry(), ScriptedFetcher::default(), Notifier::new());

    let mut state = MonitorState::new();
    let report = monitor.run_cycle(&mut state, &CancellationToken::new()).await;

    assert_eq!(report.count(StatusVerdict::Unknown), 1);
    assert!(report.checks[0].classification.detail.contains("connection refused"));
    assert_eq!(state.get("API"), Some(StatusVerdict::Unknown));
}

#[tokio::test]
async fn test_panicking_target_is_contained() {
    let registry = TargetRegistry::new(vec![
        Target::downdetector("Broken", "https://downdetector.com/status/broken/"),
        Target::generic("API", API_URL, ["operational"]),
    ]);
    let fetcher = ScriptedFetcher {
        panic_on: Some("https://downdetector.com/status/broken/".to_string()),
        ..ScriptedFetcher::with_pages(API_URL, &["operational"])
    };
    let monitor = monitor(registry, fetcher, Notifier::new());

    let mut state = MonitorState::new();
    let report = monitor.run_cycle(&mut state, &CancellationToken::new()).await;

    assert_eq!(report.faults, 1);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].name, "API");
    assert_eq!(state.get("Broken"), None);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let monitor = monitor(api_registry(), ScriptedFetcher::default(), Notifier::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let state = monitor.run(cancel).await;
    assert!(state.is_empty());
}

#[tokio::test]
async fn test_cancel_wakes_loop_delay() {
    let fetcher = ScriptedFetcher::with_pages(API_URL, &["operational"]);
    let monitor = Monitor::new(
        api_registry(),
        Arc::new(fetcher),
        Notifier::new(),
        ScheduleSettings {
            check_delay: Duration::ZERO,
            loop_delay: Duration::from_secs(3600),
        },
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let state = tokio::time::timeout(Duration::from_secs(5), monitor.run(cancel))
        .await
        .expect("loop delay should end on cancellation");
    assert_eq!(state.get("API"), Some(StatusVerdict::Ok));
}

#[tokio::test]
async fn test_cancel_between_targets() {
    let registry = TargetRegistry::new(vec![
        Target::generic("API", API_URL, ["operational"]),
        Target::downdetector("Roblox", "https://downdetector.com/status/roblox/"),
    ]);
    let fetcher = ScriptedFetcher::with_pages(API_URL, &["operational"]);
    let monitor = Monitor::new(
        registry,
        Arc::new(fetcher),
        Notifier::new(),
        ScheduleSettings {
            check_delay: Duration::from_secs(3600),
            loop_delay: Duration::ZERO,
        },
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut state = MonitorState::new();
    let report = tokio::time::timeout(
        Duration::from_secs(5),
        monitor.run_cycle(&mut state, &cancel),
    )
    .await
    .expect("check delay should end on cancellation");

    assert!(report.cancelled);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(state.get("Roblox"), None);
}

#[test]
fn test_panic_message() {
    let payload: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_message(payload.as_ref()), "boom");

    let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
    assert_eq!(panic_message(payload.as_ref()), "owned boom");

    let payload: Box<dyn Any + Send> = Box::new(42);
    assert_eq!(panic_message(payload.as_ref()), "unknown panic");
}
