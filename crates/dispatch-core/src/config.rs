//! Dispatch configuration management
//!
//! Configuration files:
//! - ~/.config/dispatch/config.yaml - Scoring bonuses and cache settings
//! - ~/.config/dispatch/tools.yaml  - Tool catalog (see `catalog`)
//! - ~/.config/dispatch/rules.yaml  - Routing rules (see `rules`)
//!
//! A missing file falls back to built-in defaults; a file that exists but
//! does not parse is a fatal error naming the file.

use crate::paths::Paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading configuration documents
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0} - run 'dispatch init' to create it")]
    NotFound(String),

    #[error("Invalid YAML in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),

    #[error("Rule '{rule}' references unknown tool: {tool}")]
    UnknownRecommendedTool { rule: String, tool: String },
}

/// Scoring bonuses and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Score bonus for tools with a free tier
    #[serde(default = "default_free_tier_bonus")]
    pub free_tier_bonus: i32,

    /// Score bonus for low-latency tools
    #[serde(default = "default_low_latency_bonus")]
    pub low_latency_bonus: i32,

    /// Seconds before the cached stats snapshot goes stale
    #[serde(default = "default_stats_ttl_secs")]
    pub stats_ttl_secs: u64,
}

fn default_free_tier_bonus() -> i32 {
    15
}

fn default_low_latency_bonus() -> i32 {
    10
}

fn default_stats_ttl_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            free_tier_bonus: default_free_tier_bonus(),
            low_latency_bonus: default_low_latency_bonus(),
            stats_ttl_secs: default_stats_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        crate::write_atomic(path, &content)
    }
}
