//! Load-time validation for settings and the target registry.

use std::collections::HashSet;
use std::fmt;

use crate::settings::{keys, Settings};
use crate::targets::{DetectionMode, TargetRegistry};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Non-fatal checks on already parsed settings.
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &Settings) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !settings.chat_enabled() {
            result.add_warning(ValidationWarning::new(
                keys::SLACK_WEBHOOK_URL,
                "is not set, chat alerts disabled",
            ));
        }

        if settings.schedule.loop_delay.is_zero() {
            result.add_warning(ValidationWarning::new(
                keys::LOOP_DELAY,
                "is 0, cycles will run back to back",
            ));
        }

        result
    }
}

/// Target registry validator.
pub struct RegistryValidator;

impl RegistryValidator {
    pub fn validate(registry: &TargetRegistry) -> ValidationResult {
        let mut result = ValidationResult::default();

        if registry.is_empty() {
            result.add_warning(ValidationWarning::new(
                "targets",
                "no targets configured, nothing will be monitored",
            ));
        }

        let mut seen = HashSet::new();
        for (index, target) in registry.iter().enumerate() {
            let path = format!("targets[{}]", index);

            if target.name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    "name cannot be empty",
                ));
            } else if !seen.insert(target.name.as_str()) {
                result.add_warning(ValidationWarning::new(
                    format!("{}.name", path),
                    format!(
                        "duplicate target name '{}', alerts and state will be shared",
                        target.name
                    ),
                ));
            }

            match url::Url::parse(&target.url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => result.add_error(ValidationError::new(
                    format!("{}.url", path),
                    format!("unsupported scheme '{}'", parsed.scheme()),
                )),
                Err(e) => result.add_error(ValidationError::new(
                    format!("{}.url", path),
                    format!("invalid URL '{}': {}", target.url, e),
                )),
            }

            if let DetectionMode::Generic { good_keywords } = &target.mode {
                if good_keywords.is_empty() {
                    result.add_warning(ValidationWarning::new(
                        format!("{}.good_keywords", path),
                        format!(
                            "'{}' has no good_keywords, every check will report DEGRADED",
                            target.name
                        ),
                    ));
                }
                if good_keywords.iter().any(|k| k.trim().is_empty()) {
                    result.add_error(ValidationError::new(
                        format!("{}.good_keywords", path),
                        "blank keyword would match every page",
                    ));
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
