//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides the `env` tag of the loaded file.
pub const ENV_OVERRIDE: &str = "ENV";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    MissingPath,
    NotFound(PathBuf),
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingPath => {
                write!(f, "Config path is not set (use --config or CONFIG_PATH)")
            }
            ConfigError::NotFound(path) => {
                write!(f, "Config file does not exist: {}", path.display())
            }
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load, apply environment overrides to, and validate a TOML config file.
///
/// `path` is whatever the CLI resolved from `--config` / `CONFIG_PATH`.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let path = path.ok_or(ConfigError::MissingPath)?;

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io(e),
    })?;

    let config = parse_config(&content, |key| std::env::var(key).ok())?;

    tracing::debug!(path = %path.display(), env = %config.env, "Configuration file read");
    Ok(config)
}

/// Parse and validate config text, resolving overrides through `lookup`.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: ServiceConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup(ENV_OVERRIDE).filter(|v| !v.is_empty()) {
        config.env = env;
    }
}
