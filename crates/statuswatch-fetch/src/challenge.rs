//! Anti-bot interstitial detection.

use std::sync::LazyLock;

use regex::Regex;

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title pattern"));

/// Titles of known challenge pages (Cloudflare), lowercase.
const CHALLENGE_TITLES: &[&str] = &["just a moment", "attention required"];

/// Extract the document title from raw HTML.
pub fn page_title(html: &str) -> Option<String> {
    TITLE_PATTERN
        .captures(html)
        .map(|cap| cap[1].trim().to_string())
}

/// Returns the offending title when the page is a challenge interstitial.
pub fn detect_challenge(title: &str) -> Option<String> {
    let lowered = title.to_lowercase();
    CHALLENGE_TITLES
        .iter()
        .any(|marker| lowered.contains(marker))
        .then(|| title.trim().to_string())
}
