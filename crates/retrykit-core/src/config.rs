use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{ConfigError, RetryConfig};

/// Retry overrides (optional `[retry]` section in config.toml).
///
/// Every field is optional; missing fields keep the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOverrides {
    /// Retries after the first attempt.
    pub max_retries: Option<u32>,
    /// Base delay in milliseconds before the first retry.
    pub initial_delay_ms: Option<u64>,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: Option<u64>,
    /// Growth factor per attempt (> 1).
    pub backoff_multiplier: Option<f64>,
    /// HTTP statuses treated as transient. Replaces the default set.
    pub retryable_status_codes: Option<Vec<u16>>,
    /// Message fragments treated as transient. Replaces the default list.
    pub network_error_messages: Option<Vec<String>>,
}

impl From<&RetryConfig> for RetryOverrides {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: Some(cfg.max_retries),
            initial_delay_ms: Some(cfg.initial_delay.as_millis() as u64),
            max_delay_ms: Some(cfg.max_delay.as_millis() as u64),
            backoff_multiplier: Some(cfg.backoff_multiplier),
            retryable_status_codes: Some(cfg.retryable_status_codes.iter().copied().collect()),
            network_error_messages: Some(cfg.network_error_messages.clone()),
        }
    }
}

impl RetryOverrides {
    /// Apply these overrides on top of `base`; fields present here win.
    pub fn merge_over(&self, base: &RetryConfig) -> Result<RetryConfig, ConfigError> {
        let mut cfg = base.clone();
        if let Some(n) = self.max_retries {
            cfg.max_retries = n;
        }
        if let Some(ms) = self.initial_delay_ms {
            cfg.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            cfg.max_delay = Duration::from_millis(ms);
        }
        if let Some(m) = self.backoff_multiplier {
            cfg.backoff_multiplier = m;
        }
        if let Some(codes) = &self.retryable_status_codes {
            cfg.retryable_status_codes = codes.iter().copied().collect();
        }
        if let Some(messages) = &self.network_error_messages {
            cfg.network_error_messages = messages
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Merge `overrides` over the built-in defaults.
pub fn merge_with_defaults(overrides: &RetryOverrides) -> Result<RetryConfig, ConfigError> {
    overrides.merge_over(&RetryConfig::default())
}

/// Global configuration loaded from `~/.config/retrykit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrykitConfig {
    /// Retry overrides; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: RetryOverrides,
}

impl RetrykitConfig {
    /// The effective retry config: file overrides merged over defaults.
    pub fn retry_config(&self) -> Result<RetryConfig, ConfigError> {
        merge_with_defaults(&self.retry)
    }

    /// Config with every retry field spelled out, as written on first run.
    pub fn with_defaults_spelled_out() -> Self {
        Self {
            retry: RetryOverrides::from(&RetryConfig::default()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("retrykit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RetrykitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RetrykitConfig::with_defaults_spelled_out();
        write_config(&path, &default_cfg)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<RetrykitConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: RetrykitConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.retry_config()
        .with_context(|| format!("invalid [retry] section in {}", path.display()))?;
    Ok(cfg)
}

pub fn write_config(path: &Path, cfg: &RetrykitConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}
