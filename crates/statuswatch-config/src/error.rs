//! Configuration errors.

use thiserror::Error;

use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Targets file not found: {0}")]
    NotFound(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Individual problems carried by this error, one per line when printed.
    pub fn problems(&self) -> Vec<String> {
        match self {
            ConfigError::Invalid(errors) => errors.iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ConfigError::NotFound("targets.toml".to_string());
        assert!(err.to_string().contains("targets.toml"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_joins_every_problem() {
        let err = ConfigError::Invalid(vec![
            ValidationError::new("EMAIL_SENDER", "is not set"),
            ValidationError::new("EMAIL_RECEIVERS", "is not set or empty"),
        ]);
        let display = err.to_string();
        assert!(display.contains("EMAIL_SENDER: is not set"));
        assert!(display.contains("EMAIL_RECEIVERS: is not set or empty"));
        assert_eq!(err.problems().len(), 2);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::from(io_err);
        assert!(err.to_string().contains("file not found"));
        assert_eq!(err.problems().len(), 1);
    }
}
