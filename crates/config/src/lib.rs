//! Configuration loading, validation, and management for AppForge.
//!
//! Loads configuration from `~/.appforge/config.toml` with environment
//! variable overrides. Validates all settings at startup; a missing
//! credential is the one failure that stops the pipeline from being built.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bearer credential for the remote generator.
pub const ENV_API_KEY: &str = "AIPIPE_TOKEN";
/// Base endpoint of the remote generator.
pub const ENV_API_BASE: &str = "AIPIPE_API_BASE";
pub const ENV_MODEL: &str = "APPFORGE_MODEL";
pub const ENV_ATTACHMENTS_DIR: &str = "APPFORGE_ATTACHMENTS_DIR";

/// System instruction used when the config sets none.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful coding assistant that outputs runnable web apps.";

/// The root configuration structure.
///
/// Maps directly to `~/.appforge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bearer credential for the remote generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base endpoint; requests go to `{api_base}/responses`
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// System instruction sent ahead of the user prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Remote calls per request before falling back
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Hard bound on a single remote call
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Pause between a rejected attempt and the next one
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Where decoded attachments are written
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,

    /// Give every request its own subdirectory under `attachments_dir`
    #[serde(default)]
    pub isolate_requests: bool,
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "gpt-5".into()
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_max_attempts() -> u32 {
    2
}
fn default_attempt_timeout_secs() -> u64 {
    120
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_attachments_dir() -> PathBuf {
    std::env::temp_dir().join("llm_attachments")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("max_attempts", &self.max_attempts)
            .field("attempt_timeout_secs", &self.attempt_timeout_secs)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("attachments_dir", &self.attachments_dir)
            .field("isolate_requests", &self.isolate_requests)
            .finish()
    }
}

impl PipelineConfig {
    /// Load configuration from the default path (~/.appforge/config.toml).
    ///
    /// Environment variables override the file:
    /// - `AIPIPE_TOKEN` (only when the file sets no key)
    /// - `AIPIPE_API_BASE`
    /// - `APPFORGE_MODEL`
    /// - `APPFORGE_ATTACHMENTS_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides, reading variables through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = get(ENV_API_KEY);
        }
        if let Some(base) = get(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(dir) = get(ENV_ATTACHMENTS_DIR) {
            self.attachments_dir = PathBuf::from(dir);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".appforge")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_attempts must be at least 1".into(),
            ));
        }

        if self.attempt_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "attempt_timeout_secs must be > 0".into(),
            ));
        }

        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_base must not be empty".into()));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// The credential, or the startup error that should abort the process.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential(ENV_API_KEY))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
            attachments_dir: default_attachments_dir(),
            isolate_requests: false,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing credential: set {0} in the environment or api_key in config.toml")]
    MissingCredential(&'static str),
}
