//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cmdlet/cmdlet.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `CMDLET_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    Missing(PathBuf),

    #[error("environment override: {0}")]
    Environment(String),
}

/// Output settings for the `cmdlet` binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Colorize status output
    pub color: bool,
    /// Print `(no value)` for commands that return nothing
    pub show_unit: bool,
    /// Print the source chain of execution errors
    pub error_sources: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            show_unit: false,
            error_sources: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub color: Option<bool>,
    pub show_unit: Option<bool>,
    pub error_sources: Option<bool>,
}

/// Get the XDG config directory for cmdlet.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cmdlet").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cmdlet.toml"))
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Boolean override from the environment; unset keys and bad values yield `None`.
fn env_bool(config: &Config, key: &str) -> Option<bool> {
    match config.get_bool(key) {
        Ok(val) => Some(val),
        Err(config::ConfigError::NotFound(_)) => None,
        Err(e) => {
            warn!("ignoring CMDLET_{}: {}", key.to_uppercase(), e);
            None
        }
    }
}

impl Settings {
    /// Overlay values win where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            color: overlay.color.unwrap_or(self.color),
            show_unit: overlay.show_unit.unwrap_or(self.show_unit),
            error_sources: overlay.error_sources.unwrap_or(self.error_sources),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is fine; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            current = current.load_file(path)?;
        }

        Self::apply_env_overrides(current)
    }

    /// Apply one config file on top of `self`.
    pub fn load_file(&self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        debug!("config file: {}", path.display());
        Ok(self.merge_with(&load_raw_settings(path)?))
    }

    /// Apply CMDLET_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CMDLET").try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Environment(e.to_string()))?;

        if let Some(val) = env_bool(&config, "color") {
            settings.color = val;
        }
        if let Some(val) = env_bool(&config, "show_unit") {
            settings.show_unit = val;
        }
        if let Some(val) = env_bool(&config, "error_sources") {
            settings.error_sources = val;
        }

        Ok(settings)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<settings>"),
            message: e.to_string(),
        })
    }
}
