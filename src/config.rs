//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`), which must exist
//! 2. `~/.switchyard/config.toml` (user)
//! 3. `/etc/switchyard/config.toml` (system)
//!
//! When none exists the built-in defaults apply. Every section and key is
//! optional.
//!
//! ```toml
//! [gateway]
//! request_timeout_secs = 30
//!
//! [cache]
//! max_entries = 1000
//! ttl_secs = 3600
//!
//! [rate_limit]
//! limit = 100
//! window_secs = 60
//!
//! [providers.openai]
//! latency_ms = 500
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::limiter::{MAX_WINDOW, RateLimitConfig};
use crate::types::ProviderId;
use crate::{GatewayError, Result};

/// Gateway configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Request handling limits.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySection {
    /// Provider call timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Maximum entries (default: 1000).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Entry time-to-live in seconds (default: 3600).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl(),
        }
    }
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.max_entries)
            .ttl(Duration::from_secs(self.ttl_secs))
    }
}

fn default_max_entries() -> usize {
    1_000
}

fn default_ttl() -> u64 {
    3600
}

/// Rate limiter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSection {
    /// Requests per client per window (default: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Window length in seconds (default: 60).
    #[serde(default = "default_window")]
    pub window_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window(),
        }
    }
}

impl RateLimitSection {
    pub fn to_rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::new()
            .limit(self.limit)
            .window(Duration::from_secs(self.window_secs))
    }
}

fn default_limit() -> usize {
    100
}

fn default_window() -> u64 {
    60
}

/// Provider configurations. Absent sections are not registered, unless
/// every section is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: Option<ProviderConfig>,
    #[serde(default)]
    pub anthropic: Option<ProviderConfig>,
    #[serde(default)]
    pub google: Option<ProviderConfig>,
    #[serde(default)]
    pub deepseek: Option<ProviderConfig>,
}

impl ProvidersConfig {
    /// Present sections, in provider declaration order.
    pub fn configured(&self) -> Vec<(ProviderId, &ProviderConfig)> {
        ProviderId::ALL
            .into_iter()
            .filter_map(|id| self.get(id).map(|p| (id, p)))
            .collect()
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderConfig> {
        match id {
            ProviderId::OpenAI => self.openai.as_ref(),
            ProviderId::Anthropic => self.anthropic.as_ref(),
            ProviderId::Google => self.google.as_ref(),
            ProviderId::DeepSeek => self.deepseek.as_ref(),
        }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// Simulated latency override in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.switchyard/config.toml`
    /// 3. `/etc/switchyard/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GatewayError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            GatewayError::Configuration(msg) => {
                GatewayError::Configuration(format!("{path:?}: {msg}"))
            }
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| {
            GatewayError::Configuration(format!("Failed to parse config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.request_timeout_secs == 0 {
            return Err(GatewayError::Configuration(
                "gateway.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.rate_limit.limit == 0 {
            return Err(GatewayError::Configuration(
                "rate_limit.limit must be positive".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(GatewayError::Configuration(
                "rate_limit.window_secs must be positive".to_string(),
            ));
        }
        if self.rate_limit.window_secs > MAX_WINDOW.as_secs() {
            return Err(GatewayError::Configuration(format!(
                "rate_limit.window_secs must not exceed {}",
                MAX_WINDOW.as_secs()
            )));
        }
        Ok(())
    }

    /// Resolve the config file path; `None` means use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(GatewayError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".switchyard").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/switchyard/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
