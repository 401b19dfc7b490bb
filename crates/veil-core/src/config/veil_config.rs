//! Top-level veil configuration with layered resolution.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AliasConfig, AliasScheme, AmbiguityPolicy, BatchConfig, ExclusionConfig, NormalizerConfig,
    ResolutionConfig, StorageConfig,
};
use crate::errors::ConfigError;
use crate::types::EntityType;

/// Project config file name, looked up in the root passed to [`VeilConfig::load`].
pub const PROJECT_CONFIG_FILE: &str = "veil.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`VEIL_*`)
/// 3. Project config (`veil.toml` in the project root)
/// 4. User config (`~/.veil/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VeilConfig {
    pub normalizer: NormalizerConfig,
    pub aliases: AliasConfig,
    pub exclusion: ExclusionConfig,
    pub resolution: ResolutionConfig,
    pub storage: StorageConfig,
    pub batch: BatchConfig,
}

/// Overrides applied on top of every other layer by the embedding application.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub threads: Option<usize>,
    pub ambiguity: Option<AmbiguityPolicy>,
    pub max_write_retries: Option<u32>,
}

impl VeilConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): programmatic overrides
        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &VeilConfig) -> Result<(), ConfigError> {
        if let Some(honorifics) = &config.normalizer.honorifics {
            if honorifics.iter().any(|h| h.trim().is_empty()) {
                return Err(ConfigError::ValidationFailed {
                    field: "normalizer.honorifics".to_string(),
                    message: "entries must not be blank".to_string(),
                });
            }
        }

        for entity_type in EntityType::ALL {
            if let Some(scheme) = config.aliases.scheme(entity_type) {
                Self::validate_scheme(entity_type, scheme)?;
            }
        }

        for pattern in &config.exclusion.patterns {
            if pattern.name.trim().is_empty() || pattern.regex.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "exclusion.patterns".to_string(),
                    message: "patterns need a name and a regex".to_string(),
                });
            }
        }

        if config.storage.max_write_retries == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.max_write_retries".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.storage.read_pool_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.read_pool_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.storage.effective_initial_backoff() > config.storage.effective_max_backoff() {
            return Err(ConfigError::ValidationFailed {
                field: "storage.initial_backoff_ms".to_string(),
                message: "must not exceed storage.max_backoff_ms".to_string(),
            });
        }
        if config.batch.threads == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "batch.threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_scheme(entity_type: EntityType, scheme: &AliasScheme) -> Result<(), ConfigError> {
        let field = format!("aliases.{}", entity_type.as_str().to_ascii_lowercase());
        match scheme {
            AliasScheme::Sequential { prefix, capacity } => {
                if *capacity == 0 {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("{field}.capacity"),
                        message: "must be greater than 0".to_string(),
                    });
                }
                if prefix.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("{field}.prefix"),
                        message: "must not be blank".to_string(),
                    });
                }
            }
            AliasScheme::NamePool { names } => {
                if names.is_empty() {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("{field}.names"),
                        message: "name pool must not be empty".to_string(),
                    });
                }
                let mut seen = HashSet::new();
                for name in names {
                    if name.trim().is_empty() {
                        return Err(ConfigError::ValidationFailed {
                            field: format!("{field}.names"),
                            message: "names must not be blank".to_string(),
                        });
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(ConfigError::ValidationFailed {
                            field: format!("{field}.names"),
                            message: format!("duplicate name {name:?}"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.veil/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        home_dir().map(|h| h.join(".veil").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored (forward-compatible).
    fn merge_toml_file(config: &mut VeilConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: VeilConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it sets a value.
    fn merge(base: &mut VeilConfig, other: &VeilConfig) {
        // Normalizer
        if other.normalizer.honorifics.is_some() {
            base.normalizer.honorifics = other.normalizer.honorifics.clone();
        }

        // Aliases
        if other.aliases.person.is_some() {
            base.aliases.person = other.aliases.person.clone();
        }
        if other.aliases.location.is_some() {
            base.aliases.location = other.aliases.location.clone();
        }
        if other.aliases.org.is_some() {
            base.aliases.org = other.aliases.org.clone();
        }

        // Exclusion
        if other.exclusion.builtin.is_some() {
            base.exclusion.builtin = other.exclusion.builtin;
        }
        if !other.exclusion.patterns.is_empty() {
            base.exclusion.patterns = other.exclusion.patterns.clone();
        }

        // Resolution
        if other.resolution.ambiguity.is_some() {
            base.resolution.ambiguity = other.resolution.ambiguity;
        }

        // Storage
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.max_write_retries.is_some() {
            base.storage.max_write_retries = other.storage.max_write_retries;
        }
        if other.storage.initial_backoff_ms.is_some() {
            base.storage.initial_backoff_ms = other.storage.initial_backoff_ms;
        }
        if other.storage.max_backoff_ms.is_some() {
            base.storage.max_backoff_ms = other.storage.max_backoff_ms;
        }

        // Batch
        if other.batch.threads.is_some() {
            base.batch.threads = other.batch.threads;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `VEIL_DB_PATH`, `VEIL_BATCH_THREADS`, etc. Unparseable numeric
    /// values are ignored; an unknown ambiguity policy is rejected.
    fn apply_env_overrides(config: &mut VeilConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("VEIL_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("VEIL_BATCH_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.batch.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VEIL_STORAGE_MAX_WRITE_RETRIES") {
            if let Ok(v) = val.parse::<u32>() {
                config.storage.max_write_retries = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VEIL_RESOLUTION_AMBIGUITY") {
            let policy = AmbiguityPolicy::parse(&val).ok_or_else(|| ConfigError::InvalidValue {
                field: "VEIL_RESOLUTION_AMBIGUITY".to_string(),
                message: format!("expected `hold` or `treat_as_new`, got {val:?}"),
            })?;
            config.resolution.ambiguity = Some(policy);
        }
        Ok(())
    }

    /// Apply programmatic overrides (highest priority).
    fn apply_overrides(config: &mut VeilConfig, overrides: &ConfigOverrides) {
        if let Some(ref v) = overrides.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(v) = overrides.threads {
            config.batch.threads = Some(v);
        }
        if let Some(v) = overrides.ambiguity {
            config.resolution.ambiguity = Some(v);
        }
        if let Some(v) = overrides.max_write_retries {
            config.storage.max_write_retries = Some(v);
        }
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
