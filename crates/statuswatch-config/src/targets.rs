//! Monitored targets and the registry that holds them.

use serde::{Deserialize, Serialize};

/// How a target's page is turned into a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DetectionMode {
    /// A downdetector.com status page.
    #[serde(rename = "downdetector", alias = "down_detector")]
    DownDetector,
    /// Any status page; healthy when one of the keywords appears.
    Generic {
        /// Case-insensitive substrings that indicate a healthy service.
        #[serde(default)]
        good_keywords: Vec<String>,
    },
}

impl DetectionMode {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMode::DownDetector => "downdetector",
            DetectionMode::Generic { .. } => "generic",
        }
    }
}

/// A monitored service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Human-readable label used in alerts.
    pub name: String,
    /// Status page to fetch.
    pub url: String,
    /// Detection mode and its parameters.
    #[serde(flatten)]
    pub mode: DetectionMode,
}

impl Target {
    /// Create a downdetector target.
    pub fn downdetector(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            mode: DetectionMode::DownDetector,
        }
    }

    /// Create a generic keyword target.
    pub fn generic<I, S>(name: impl Into<String>, url: impl Into<String>, good_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            url: url.into(),
            mode: DetectionMode::Generic {
                good_keywords: good_keywords.into_iter().map(Into::into).collect(),
            },
        }
    }
}

/// Ordered, immutable list of monitored targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRegistry {
    #[serde(default)]
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// The registry used when no targets file is given.
    pub fn builtin() -> Self {
        Self::new(vec![
            Target::downdetector(
                "Internet Archive",
                "https://downdetector.com/status/internetarchive/",
            ),
            Target::downdetector("Roblox", "https://downdetector.com/status/roblox/"),
            Target::generic(
                "OpenAI API",
                "https://status.openai.com/",
                ["all systems operational", "operational"],
            ),
        ])
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// First target with the given name.
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }
}

impl<'a> IntoIterator for &'a TargetRegistry {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order() {
        let registry = TargetRegistry::builtin();
        let names: Vec<_> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Internet Archive", "Roblox", "OpenAI API"]);
    }

    #[test]
    fn test_builtin_generic_keywords() {
        let registry = TargetRegistry::builtin();
        let openai = registry.get("OpenAI API").unwrap();
        assert_eq!(
            openai.mode,
            DetectionMode::Generic {
                good_keywords: vec![
                    "all systems operational".to_string(),
                    "operational".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(DetectionMode::DownDetector.label(), "downdetector");
        assert_eq!(
            DetectionMode::Generic {
                good_keywords: vec![]
            }
            .label(),
            "generic"
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = TargetRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("anything").is_none());
    }
}
