//! Standard paths used by dispatch

use std::path::PathBuf;

/// Standard dispatch paths
pub struct Paths {
    /// Config directory (~/.config/dispatch)
    pub config: PathBuf,
    /// Data directory (~/.local/share/dispatch)
    pub data: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dispatch");

        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("dispatch");

        Self { config, data }
    }

    /// Tool catalog definitions
    pub fn tools_file(&self) -> PathBuf {
        self.config.join("tools.yaml")
    }

    /// Routing rules
    pub fn rules_file(&self) -> PathBuf {
        self.config.join("rules.yaml")
    }

    /// Scoring and cache settings
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.yaml")
    }

    /// Routing history log
    pub fn history_file(&self) -> PathBuf {
        self.data.join("history.json")
    }

    /// Cached statistics snapshot
    pub fn stats_file(&self) -> PathBuf {
        self.data.join("stats.json")
    }
}
