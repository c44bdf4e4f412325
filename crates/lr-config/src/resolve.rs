//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → defaults.

use std::path::{Path, PathBuf};

use crate::config::RetireConfig;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Where the configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/log-retire/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A discovered config file path and where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path to retire.json (None when using built-in defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "LOG_RETIRE_CONFIG";
pub const ENV_CONFIG_DIR: &str = "LOG_RETIRE_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "retire.json";

/// Application name for XDG directories.
const APP_NAME: &str = "log-retire";

/// Resolve the configuration file path.
///
/// An explicit CLI path is always returned, existing or not, so that a
/// typo surfaces as a load error instead of silently using defaults.
pub fn resolve_config(cli_path: Option<&Path>) -> ResolvedPath {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return ResolvedPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    // 5. System config
    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return ResolvedPath {
            path: Some(system_path),
            source: ConfigSource::SystemConfig,
        };
    }

    ResolvedPath::default()
}

/// Resolve, load and validate the configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<(RetireConfig, ResolvedPath)> {
    let resolved = resolve_config(cli_path);

    let config = match &resolved.path {
        Some(path) => {
            if !path.exists() {
                return Err(ValidationError::IoError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            RetireConfig::from_file(path)?
        }
        None => RetireConfig::default(),
    };

    validate_config(&config)?;
    Ok((config, resolved))
}

/// Get the XDG config directory for log-retire.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
