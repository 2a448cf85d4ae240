//! Startup configuration helpers shared by the commands.

use std::path::Path;

use tracing::{error, info, warn};

use statuswatch_config::{
    ConfigError, RegistryLoader, RegistryValidator, Settings, SettingsValidator, TargetRegistry,
    ValidationResult,
};

/// Load the registry from `path`, or the built-in registry when absent.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<TargetRegistry, ConfigError> {
    let registry = match path {
        Some(path) => {
            info!("Loading targets from {}", path.display());
            RegistryLoader::load(path)?
        }
        None => TargetRegistry::builtin(),
    };

    log_warnings(&RegistryValidator::validate(&registry));
    Ok(registry)
}

/// Read and validate the full settings, including email credentials.
pub(crate) fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Settings::from_env()?;
    log_warnings(&SettingsValidator::validate(&settings));
    Ok(settings)
}

/// Log every problem in a configuration error.
pub(crate) fn report(err: &ConfigError) {
    error!("Configuration errors:");
    for problem in err.problems() {
        error!("  - {}", problem);
    }
}

/// Combine two loads, reporting the problems of both before failing.
pub(crate) fn both<A, B>(
    a: Result<A, ConfigError>,
    b: Result<B, ConfigError>,
) -> Result<(A, B), ConfigError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => {
            report(&e);
            Err(e)
        }
        (Err(first), Err(second)) => {
            report(&first);
            report(&second);
            Err(first)
        }
    }
}

fn log_warnings(result: &ValidationResult) {
    for warning in &result.warnings {
        warn!("{}", warning);
    }
}
