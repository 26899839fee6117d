// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://www.baseball-reference.com";

/// Session settings. Every field has a default, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_requests_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("bref_boxes/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
            max_requests_per_minute: 10,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file at `path` (if any), then `BREF_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml_str(&text)
                    .with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        debug!(?cfg, "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // an empty document deserializes to unit, not a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply overrides from a key lookup (the environment, in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BREF_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("BREF_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = lookup("BREF_TIMEOUT_SECS") {
            self.timeout_secs = v
                .parse()
                .with_context(|| format!("BREF_TIMEOUT_SECS={v}"))?;
        }
        if let Some(v) = lookup("BREF_MAX_RETRIES") {
            self.max_retries = v
                .parse()
                .with_context(|| format!("BREF_MAX_RETRIES={v}"))?;
        }
        if let Some(v) = lookup("BREF_REQUESTS_PER_MINUTE") {
            self.max_requests_per_minute = v
                .parse()
                .with_context(|| format!("BREF_REQUESTS_PER_MINUTE={v}"))?;
        }
        Ok(())
    }
}
