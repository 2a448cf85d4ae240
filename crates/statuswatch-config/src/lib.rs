//! # StatusWatch Config
//!
//! Environment-sourced settings and the static target registry.

mod error;
mod loader;
mod settings;
mod targets;
mod validator;

pub use error::ConfigError;
pub use loader::RegistryLoader;
pub use settings::*;
pub use targets::{DetectionMode, Target, TargetRegistry};
pub use validator::{
    RegistryValidator, SettingsValidator, ValidationError, ValidationResult, ValidationWarning,
};
