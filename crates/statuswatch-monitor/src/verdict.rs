//! Status verdicts.

use serde::{Deserialize, Serialize};

/// Health of a target as judged from one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusVerdict {
    Ok,
    Degraded,
    /// Fetch failed or the page could not be interpreted.
    Unknown,
}

impl std::fmt::Display for StatusVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusVerdict::Ok => write!(f, "OK"),
            StatusVerdict::Degraded => write!(f, "DEGRADED"),
            StatusVerdict::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A verdict together with what led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: StatusVerdict,
    /// Free text for alerts and logs, e.g. the matched keyword.
    pub detail: String,
}

impl Classification {
    pub fn new(verdict: StatusVerdict, detail: impl Into<String>) -> Self {
        Self {
            verdict,
            detail: detail.into(),
        }
    }

    pub fn ok(detail: impl Into<String>) -> Self {
        Self::new(StatusVerdict::Ok, detail)
    }

    pub fn degraded(detail: impl Into<String>) -> Self {
        Self::new(StatusVerdict::Degraded, detail)
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(StatusVerdict::Unknown, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_display() {
        assert_eq!(StatusVerdict::Ok.to_string(), "OK");
        assert_eq!(StatusVerdict::Degraded.to_string(), "DEGRADED");
        assert_eq!(StatusVerdict::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_verdict_serialize() {
        let json = serde_json::to_string(&StatusVerdict::Degraded).unwrap();
        assert_eq!(json, "\"DEGRADED\"");
    }
}
