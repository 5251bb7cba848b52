//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `~/.wello/config.toml` (user)
//! 3. `/etc/wello/config.toml` (system)
//! 4. built-in defaults
//!
//! A few settings can then be overridden from the environment
//! (`WELLO_CACHE_TTL_SECS`, `WELLO_GENERATION_TIMEOUT_SECS`, `WELLO_MODEL`).
//!
//! The API key comes from `OPENAI_API_KEY`, falling back to
//! `~/.wello/secrets.toml`, which must not be group or world readable.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::classify::ClassificationStrategy;
use crate::generation::CompletionParams;
use crate::providers::RetryConfig;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::stats::DEFAULT_WINDOW;
use crate::{Result, WelloError};

/// Environment variable holding the generation-service API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Generation-service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// API base URL (default: https://api.openai.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier (default: gpt-3.5-turbo).
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (default: 0.5).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Output-length cap in tokens (default: 800).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-attempt timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Classification strategy for unrecognised queries (default: combined).
    #[serde(default)]
    pub strategy: ClassificationStrategy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            strategy: ClassificationStrategy::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    800
}

fn default_timeout() -> u64 {
    30
}

/// Retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry, in milliseconds (default: 500).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff cap, in milliseconds (default: 2000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    2_000
}

/// Cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Entry time-to-live in seconds (default: 300).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Maximum number of entries (default: 5000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}

fn default_max_entries() -> u64 {
    5_000
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Number of request durations kept for the snapshot (default: 100).
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl Config {
    /// Load configuration from the standard locations, then apply
    /// environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            WelloError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            WelloError::Configuration(msg) => {
                WelloError::Configuration(format!("{msg} (in {path:?})"))
            }
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| WelloError::Configuration(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every request fail.
    fn validate(&self) -> Result<()> {
        if self.generation.timeout_secs == 0 {
            return Err(WelloError::Configuration(
                "generation timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ttl) = parse_env_u64(&lookup, "WELLO_CACHE_TTL_SECS")? {
            self.cache.ttl_secs = ttl;
        }
        if let Some(timeout) = parse_env_u64(&lookup, "WELLO_GENERATION_TIMEOUT_SECS")? {
            self.generation.timeout_secs = timeout;
        }
        if let Some(model) = lookup("WELLO_MODEL").filter(|m| !m.trim().is_empty()) {
            self.generation.model = model.trim().to_string();
        }
        self.validate()
    }

    /// Resolve the config file path, if any file applies.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(WelloError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".wello").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/wello/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Completion parameters derived from `[generation]`.
    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams::new()
            .model(self.generation.model.clone())
            .temperature(self.generation.temperature)
            .max_tokens(self.generation.max_tokens)
            .timeout(Duration::from_secs(self.generation.timeout_secs))
    }

    /// Retry policy derived from `[retry]`.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.retry.max_attempts)
            .initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
    }

    /// Cache configuration derived from `[cache]`.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .ttl(Duration::from_secs(self.cache.ttl_secs))
    }
}

fn parse_env_u64<F>(lookup: &F, name: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
            WelloError::Configuration(format!("Invalid value for {name}: {raw:?} ({e})"))
        }),
    }
}

/// Secrets file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load `~/.wello/secrets.toml` with a permission check.
    ///
    /// Returns empty secrets if the file does not exist.
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".wello").join("secrets.toml");
            if user_secrets.exists() {
                return Self::from_file(&user_secrets);
            }
        }
        Ok(Secrets::default())
    }

    /// Load a secrets file, rejecting insecure permissions.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            WelloError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            WelloError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            WelloError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(WelloError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Resolve the API key for a process.
    ///
    /// A non-blank `OPENAI_API_KEY` wins and the secrets file is not read at
    /// all; otherwise `~/.wello/secrets.toml` is loaded and checked.
    pub fn resolve_api_key() -> Result<Option<String>> {
        Self::resolve_api_key_with(|name| std::env::var(name).ok(), Self::load)
    }

    /// Like [`resolve_api_key`](Self::resolve_api_key) with an explicit
    /// variable lookup and secrets loader.
    pub fn resolve_api_key_with<F, L>(lookup: F, load: L) -> Result<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
        L: FnOnce() -> Result<Secrets>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            return Ok(Some(key));
        }
        Ok(load()?.api_key)
    }

    /// API key from `lookup`, falling back to these secrets.
    pub fn api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}
