//! # Configuration
//!
//! Loads the YAML configuration (`data/config.yaml` by default): the process-wide
//! retry defaults, per-endpoint overrides, and logging settings.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::policy::{PolicyOverrides, RetryPolicy};

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    /// Overrides applied to the documented defaults for every endpoint.
    #[serde(default)]
    pub retry: PolicyOverrides,
    /// Per-endpoint overrides, layered over `retry`.
    #[serde(default)]
    pub endpoints: HashMap<String, PolicyOverrides>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console output is always on.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            ansi: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid "all defaults" config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(content).context("Invalid YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Looks in the working directory first, then the user config directory.
    pub fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return Some(local);
        }
        let user = dirs::config_dir()?.join("bulwark").join("config.yaml");
        user.exists().then_some(user)
    }

    /// The process-wide default policy: documented defaults with `retry` applied.
    pub fn default_policy(&self) -> RetryPolicy {
        RetryPolicy::default().merged(&self.retry)
    }

    /// Configured overrides for one endpoint (empty if none are configured).
    pub fn overrides_for(&self, endpoint: &str) -> PolicyOverrides {
        self.endpoints.get(endpoint).copied().unwrap_or_default()
    }

    /// Fully merged policy for one endpoint.
    pub fn policy_for(&self, endpoint: &str) -> RetryPolicy {
        self.default_policy().merged(&self.overrides_for(endpoint))
    }

    pub fn validate(&self) -> Result<()> {
        check_policy("retry", &self.default_policy())?;
        for name in self.endpoints.keys() {
            check_policy(name, &self.policy_for(name))?;
        }
        Ok(())
    }
}

fn check_policy(scope: &str, policy: &RetryPolicy) -> Result<()> {
    if !policy.backoff_multiplier.is_finite() || policy.backoff_multiplier < 0.0 {
        bail!(
            "[{}] backoff_multiplier must be a non-negative number, got {}",
            scope,
            policy.backoff_multiplier
        );
    }
    if policy.base_delay_ms > policy.max_delay_ms {
        bail!(
            "[{}] base_delay_ms ({}) exceeds max_delay_ms ({})",
            scope,
            policy.base_delay_ms,
            policy.max_delay_ms
        );
    }
    if policy.circuit_breaker_threshold == 0 {
        bail!("[{}] circuit_breaker_threshold must be at least 1", scope);
    }
    Ok(())
}
