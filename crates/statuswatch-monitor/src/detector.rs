//! Change detection.

use std::collections::HashMap;

use statuswatch_config::Target;

use crate::alerts::Alert;
use crate::verdict::{Classification, StatusVerdict};

/// Last reported verdict per target name, scoped to one monitoring run.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    verdicts: HashMap<String, StatusVerdict>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last verdict recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<StatusVerdict> {
        self.verdicts.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Store `verdict` and return what it replaced.
    fn record(&mut self, name: &str, verdict: StatusVerdict) -> Option<StatusVerdict> {
        self.verdicts.insert(name.to_string(), verdict)
    }
}

/// Record the verdict for `target` and decide whether it is reportable.
///
/// Returns an alert only when a previous verdict exists and differs. The
/// first observation of a target sets its baseline silently.
pub fn evaluate(
    target: &Target,
    classification: &Classification,
    state: &mut MonitorState,
) -> Option<Alert> {
    let previous = state.record(&target.name, classification.verdict)?;
    (previous != classification.verdict).then(|| {
        Alert::new(
            &target.name,
            &target.url,
            previous,
            classification.verdict,
            &classification.detail,
        )
    })
}
