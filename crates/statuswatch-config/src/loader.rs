//! Target registry loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::targets::TargetRegistry;
use crate::validator::RegistryValidator;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Loads a [`TargetRegistry`] from TOML with environment variable substitution.
///
/// ```toml
/// [[targets]]
/// name = "Roblox"
/// url = "https://downdetector.com/status/roblox/"
/// mode = "downdetector"
///
/// [[targets]]
/// name = "OpenAI API"
/// url = "https://status.openai.com/"
/// mode = "generic"
/// good_keywords = ["all systems operational", "operational"]
/// ```
pub struct RegistryLoader;

impl RegistryLoader {
    /// Load and validate a registry from a TOML file.
    pub fn load(path: &Path) -> Result<TargetRegistry, ConfigError> {
        let expanded = Self::expand_path(&path.to_string_lossy());
        let path = Path::new(&expanded);
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load and validate a registry from a TOML string.
    pub fn load_str(content: &str) -> Result<TargetRegistry, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let registry: TargetRegistry = toml::from_str(&expanded)?;

        let result = RegistryValidator::validate(&registry);
        if !result.is_valid() {
            return Err(ConfigError::Invalid(result.errors));
        }

        Ok(registry)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
