use super::*;
use crate::verdict::StatusVerdict;
use statuswatch_fetch::FetchError;
use std::time::Duration;

fn downdetector() -> Target {
    Target::downdetector("Roblox", "https://downdetector.com/status/roblox/")
}

fn generic(keywords: &[&str]) -> Target {
    Target::generic("API", "https://status.example.com/", keywords.iter().copied())
}

fn page(text: &str) -> FetchResult {
    Ok(text.to_string())
}

#[test]
fn test_failure_is_unknown_for_every_mode() {
    let failures = [
        FetchError::Timeout(Duration::from_secs(45)),
        FetchError::Status(503),
        FetchError::Blocked("Just a moment...".to_string()),
    ];

    for failure in failures {
        let fetched: FetchResult = Err(failure);
        assert_eq!(classify(&downdetector(), &fetched).verdict, StatusVerdict::Unknown);
        assert_eq!(classify(&generic(&["ok"]), &fetched).verdict, StatusVerdict::Unknown);
    }
}

#[test]
fn test_failure_detail_names_cause() {
    let fetched: FetchResult = Err(FetchError::Status(503));
    let result = classify(&downdetector(), &fetched);
    assert_eq!(result.detail, "fetch failed: HTTP status 503");
}

#[test]
fn test_downdetector_no_problems() {
    let result = classify(
        &downdetector(),
        &page("<p>User reports indicate no current problems at Roblox</p>"),
    );
    assert_eq!(result.verdict, StatusVerdict::Ok);
}

#[test]
fn test_downdetector_possible_problems() {
    let result = classify(
        &downdetector(),
        &page("User reports indicate possible problems at Roblox"),
    );
    assert_eq!(result, Classification::degraded("possible problems"));
}

#[test]
fn test_downdetector_outage() {
    let result = classify(
        &downdetector(),
        &page("User reports INDICATE PROBLEMS at Roblox"),
    );
    assert_eq!(result, Classification::degraded("outage detected"));
}

#[test]
fn test_downdetector_no_markers_is_unknown() {
    let result = classify(&downdetector(), &page("<html><body>Redesigned page</body></html>"));
    assert_eq!(result.verdict, StatusVerdict::Unknown);
}

#[test]
fn test_generic_keyword_match() {
    let target = generic(&["operational"]);
    let result = classify(&target, &page("All Systems Operational"));
    assert_eq!(result, Classification::ok("matched \"operational\""));
}

#[test]
fn test_generic_no_match() {
    let target = generic(&["operational"]);
    let result = classify(&target, &page("Partial outage"));
    assert_eq!(result.verdict, StatusVerdict::Degraded);
}

#[test]
fn test_generic_first_matching_keyword_reported() {
    let target = generic(&["all systems operational", "operational"]);
    let result = classify(&target, &page("all systems operational"));
    assert_eq!(result.detail, "matched \"all systems operational\"");
}

#[test]
fn test_generic_uppercase_keyword() {
    let target = generic(&["OPERATIONAL"]);
    let result = classify(&target, &page("api: operational"));
    assert_eq!(result.verdict, StatusVerdict::Ok);
}

#[test]
fn test_generic_empty_keywords_always_degraded() {
    let target = generic(&[]);
    let result = classify(&target, &page("All Systems Operational"));
    assert_eq!(result, Classification::degraded("no good keywords configured"));
}

#[test]
fn test_classify_is_idempotent() {
    let target = generic(&["ok"]);
    let fetched = page("status: ok");
    assert_eq!(classify(&target, &fetched), classify(&target, &fetched));
}
