//! Rule configuration and its precedence-based resolution.
//!
//! The rule needs a handful of names: the trigger attribute that marks a
//! render method, the attribute written on generated companions, the element
//! function and class used in generated code, and the indent unit. Each value
//! is resolved from (highest precedence first):
//!
//! 1. CLI flags
//! 2. Environment variables (`VYLINT_*`)
//! 3. Project config file (`vylint.json` in the workspace root, or `--config`)
//! 4. Built-in defaults
//!
//! Class-like names are stored without a leading backslash.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name of the project config, looked up in the workspace root.
pub const PROJECT_CONFIG_FILE: &str = "vylint.json";

/// Default trigger attribute.
pub const DEFAULT_TRIGGER_ATTRIBUTE: &str = "StefanFisk\\Vy\\Attributes\\VyComponent";
/// Default attribute placed on generated companions.
pub const DEFAULT_COMPANION_ATTRIBUTE: &str = "StefanFisk\\Vy\\Attributes\\VyElement";
/// Default element construction function.
pub const DEFAULT_ELEMENT_FUNCTION: &str = "StefanFisk\\Vy\\el";
/// Default companion return type.
pub const DEFAULT_ELEMENT_CLASS: &str = "StefanFisk\\Vy\\Element";
/// Default indent unit.
pub const DEFAULT_INDENT: &str = "    ";

// ============================================================================
// Errors
// ============================================================================

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {path}")]
    NotFound { path: String },

    /// IO error while reading a config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    /// A resolved value is unusable.
    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// Rule Configuration
// ============================================================================

/// The names the render/element pairing rule works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Fully qualified attribute that activates the pairing check.
    pub trigger_attribute: String,
    /// Fully qualified attribute written on generated companions.
    pub companion_attribute: String,
    /// Fully qualified function the companion body calls.
    pub element_function: String,
    /// Fully qualified return type of generated companions.
    pub element_class: String,
    /// One level of indentation in generated code.
    pub indent: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            trigger_attribute: DEFAULT_TRIGGER_ATTRIBUTE.to_string(),
            companion_attribute: DEFAULT_COMPANION_ATTRIBUTE.to_string(),
            element_function: DEFAULT_ELEMENT_FUNCTION.to_string(),
            element_class: DEFAULT_ELEMENT_CLASS.to_string(),
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the project config file.
    ProjectConfig = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Shape of `vylint.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub trigger_attribute: Option<String>,
    pub companion_attribute: Option<String>,
    pub element_function: Option<String>,
    pub element_class: Option<String>,
    pub indent: Option<String>,
}

impl ProjectConfig {
    /// Read and parse a project config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: display.clone(),
                }
            } else {
                ConfigError::Io {
                    path: display.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit config file (`--config`).
    pub config_file: Option<PathBuf>,
    /// `--trigger-attribute`.
    pub trigger_attribute: Option<String>,
    /// `--companion-attribute`.
    pub companion_attribute: Option<String>,
    /// `--element-function`.
    pub element_function: Option<String>,
    /// `--element-class`.
    pub element_class: Option<String>,
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub trigger_attribute: ConfigValue<String>,
    pub companion_attribute: ConfigValue<String>,
    pub element_function: ConfigValue<String>,
    pub element_class: ConfigValue<String>,
    pub indent: ConfigValue<String>,
    /// The project config file that was read, if any.
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let defaults = RuleConfig::default();
        let d = |v: String| ConfigValue::new(v, ConfigSource::Default);
        ResolvedConfig {
            trigger_attribute: d(defaults.trigger_attribute),
            companion_attribute: d(defaults.companion_attribute),
            element_function: d(defaults.element_function),
            element_class: d(defaults.element_class),
            indent: d(defaults.indent),
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from all sources, reading the process environment.
    pub fn resolve(workspace_root: &Path, overrides: &CliOverrides) -> ConfigResult<Self> {
        Self::resolve_with_env(workspace_root, overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        workspace_root: &Path,
        overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut config = ResolvedConfig::default();

        // An explicit --config must exist; the implicit one is optional.
        let project_path = match &overrides.config_file {
            Some(path) => Some(path.clone()),
            None => {
                let implicit = workspace_root.join(PROJECT_CONFIG_FILE);
                implicit.is_file().then_some(implicit)
            }
        };
        if let Some(path) = project_path {
            debug!(path = %path.display(), "loading project config");
            let project = ProjectConfig::load(&path)?;
            config.apply_project_config(project);
            config.config_file = Some(path);
        }

        config.apply_env_vars(env);
        config.apply_cli_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_project_config(&mut self, project: ProjectConfig) {
        let source = ConfigSource::ProjectConfig;
        set(&mut self.trigger_attribute, project.trigger_attribute, source);
        set(&mut self.companion_attribute, project.companion_attribute, source);
        set(&mut self.element_function, project.element_function, source);
        set(&mut self.element_class, project.element_class, source);
        set(&mut self.indent, project.indent, source);
    }

    fn apply_env_vars(&mut self, env: impl Fn(&str) -> Option<String>) {
        let source = ConfigSource::EnvVar;
        set(
            &mut self.trigger_attribute,
            env("VYLINT_TRIGGER_ATTRIBUTE"),
            source,
        );
        set(
            &mut self.companion_attribute,
            env("VYLINT_COMPANION_ATTRIBUTE"),
            source,
        );
        set(
            &mut self.element_function,
            env("VYLINT_ELEMENT_FUNCTION"),
            source,
        );
        set(&mut self.element_class, env("VYLINT_ELEMENT_CLASS"), source);
        set(&mut self.indent, env("VYLINT_INDENT"), source);
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        let source = ConfigSource::CliFlag;
        set(
            &mut self.trigger_attribute,
            overrides.trigger_attribute.clone(),
            source,
        );
        set(
            &mut self.companion_attribute,
            overrides.companion_attribute.clone(),
            source,
        );
        set(
            &mut self.element_function,
            overrides.element_function.clone(),
            source,
        );
        set(
            &mut self.element_class,
            overrides.element_class.clone(),
            source,
        );
    }

    fn validate(&self) -> ConfigResult<()> {
        let names = [
            ("trigger_attribute", &self.trigger_attribute.value),
            ("companion_attribute", &self.companion_attribute.value),
            ("element_function", &self.element_function.value),
            ("element_class", &self.element_class.value),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    message: "name must not be empty".to_string(),
                });
            }
            if value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("'{}' contains whitespace", value),
                });
            }
        }
        if self.indent.value.is_empty() || self.indent.value.chars().any(|c| c != ' ' && c != '\t')
        {
            return Err(ConfigError::Invalid {
                field: "indent",
                message: "indent must be a non-empty run of spaces or tabs".to_string(),
            });
        }
        Ok(())
    }

    /// The plain rule configuration.
    pub fn rule_config(&self) -> RuleConfig {
        RuleConfig {
            trigger_attribute: self.trigger_attribute.value.clone(),
            companion_attribute: self.companion_attribute.value.clone(),
            element_function: self.element_function.value.clone(),
            element_class: self.element_class.value.clone(),
            indent: self.indent.value.clone(),
        }
    }
}

/// Overwrite `slot` with `value` when present, normalizing class-like names.
fn set(slot: &mut ConfigValue<String>, value: Option<String>, source: ConfigSource) {
    if let Some(value) = value {
        let value = match value.strip_prefix('\\') {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => value,
        };
        *slot = slot.clone().merge(ConfigValue::new(value, source));
    }
}
