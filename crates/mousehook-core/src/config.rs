//! Hook configuration and its on-disk location.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime options for the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Log every decoded event at `trace` level.
    pub trace_events: bool,
    /// Warn when a listener runs longer than this (ms). 0 disables the check.
    /// Listeners run inside the system-wide input chain, so slow ones delay
    /// input for every application.
    pub slow_listener_warn_ms: u64,
    /// Name of the thread started by the background runner.
    pub thread_name: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            trace_events: false,
            slow_listener_warn_ms: 50,
            thread_name: "mouse-hook".into(),
        }
    }
}

impl HookConfig {
    /// Parse a YAML document. Missing keys take their default.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(?path, "Loaded hook config");
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(?path, "No hook config found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// `<config dir>/mousehook/config.yaml`.
    pub fn default_path() -> PathBuf {
        let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("mousehook").join("config.yaml")
    }
}
