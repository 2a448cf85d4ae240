//! Status classification.
//!
//! Turns a fetch outcome into a [`Classification`] according to the
//! target's detection mode. Matching is case-insensitive throughout and the
//! functions here are pure.

use statuswatch_config::{DetectionMode, Target};
use statuswatch_fetch::FetchResult;

use crate::verdict::Classification;

/// DownDetector wording for a healthy service.
pub const NO_PROBLEMS_MARKER: &str = "indicate no current problems";
/// DownDetector wording for an elevated report count.
pub const POSSIBLE_PROBLEMS_MARKER: &str = "possible problems";
/// DownDetector wording for a confirmed outage.
pub const PROBLEMS_MARKER: &str = "indicate problems";

/// Classify one fetch outcome for `target`.
pub fn classify(target: &Target, fetched: &FetchResult) -> Classification {
    let content = match fetched {
        Ok(content) => content,
        Err(e) => return Classification::unknown(format!("fetch failed: {}", e)),
    };

    match &target.mode {
        DetectionMode::DownDetector => classify_downdetector(content),
        DetectionMode::Generic { good_keywords } => {
            classify_generic(content, good_keywords.as_slice())
        }
    }
}

/// Classify a DownDetector status page.
///
/// The no-problems marker is checked first since "indicate no current
/// problems" also reads as a problem report to a looser match.
pub fn classify_downdetector(content: &str) -> Classification {
    let text = content.to_lowercase();

    if text.contains(NO_PROBLEMS_MARKER) {
        Classification::ok("no current problems")
    } else if text.contains(POSSIBLE_PROBLEMS_MARKER) {
        Classification::degraded("possible problems")
    } else if text.contains(PROBLEMS_MARKER) {
        Classification::degraded("outage detected")
    } else {
        Classification::unknown("no status marker found on page")
    }
}

/// Classify a status page by looking for any of the good keywords.
pub fn classify_generic<S: AsRef<str>>(content: &str, good_keywords: &[S]) -> Classification {
    if good_keywords.is_empty() {
        return Classification::degraded("no good keywords configured");
    }

    let text = content.to_lowercase();
    good_keywords
        .iter()
        .map(AsRef::as_ref)
        .find(|keyword| text.contains(&keyword.to_lowercase()))
        .map(|keyword| Classification::ok(format!("matched \"{}\"", keyword)))
        .unwrap_or_else(|| {
            Classification::degraded(format!(
                "none of {} good keywords found",
                good_keywords.len()
            ))
        })
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
