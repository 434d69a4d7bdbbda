//! Statistics over the routing history
//!
//! Pure counting: totals, per-tool and per-rule counts, daily buckets,
//! success rate. A snapshot is cached to disk and rebuilt when it is
//! older than the configured TTL or when a rebuild is forced.

use crate::history::HistoryRecord;
use crate::paths::Paths;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregated view of the routing history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub total_routes: usize,
    pub successful: usize,
    /// Selected tool -> count
    pub by_tool: BTreeMap<String, usize>,
    /// Matched rule id -> count
    pub by_rule: BTreeMap<String, usize>,
    /// YYYY-MM-DD -> count
    pub by_day: BTreeMap<String, usize>,
}

impl StatsSnapshot {
    /// Aggregate a record set
    pub fn compute(records: &[HistoryRecord]) -> Self {
        let mut successful = 0;
        let mut by_tool = BTreeMap::new();
        let mut by_rule = BTreeMap::new();
        let mut by_day = BTreeMap::new();

        for record in records {
            if record.successful {
                successful += 1;
            }
            if let Some(tool) = &record.selected_tool {
                *by_tool.entry(tool.clone()).or_insert(0) += 1;
            }
            if let Some(rule) = &record.matched_rule {
                *by_rule.entry(rule.id.clone()).or_insert(0) += 1;
            }
            let day = record.timestamp.format("%Y-%m-%d").to_string();
            *by_day.entry(day).or_insert(0) += 1;
        }

        Self {
            generated_at: Utc::now(),
            total_routes: records.len(),
            successful,
            by_tool,
            by_rule,
            by_day,
        }
    }

    /// Success rate in percent over all records
    pub fn success_rate(&self) -> f64 {
        if self.total_routes == 0 {
            0.0
        } else {
            self.successful as f64 / self.total_routes as f64 * 100.0
        }
    }

    /// Age of this snapshot in seconds
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.generated_at).num_seconds()
    }
}

/// Snapshot cache bound to one file path
pub struct StatsCache {
    path: PathBuf,
}

impl StatsCache {
    /// Cache at the default location, creating the data directory
    pub fn new() -> Result<Self> {
        let paths = Paths::new();
        fs::create_dir_all(&paths.data)
            .with_context(|| format!("Failed to create data directory: {}", paths.data.display()))?;
        Ok(Self::at(&paths.stats_file()))
    }

    /// Cache at a specific path
    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Return the cached snapshot unless it is stale, else recompute
    /// from the records and cache the result
    pub fn load_or_compute(
        &self,
        records: &[HistoryRecord],
        ttl_secs: u64,
        force: bool,
    ) -> Result<StatsSnapshot> {
        if !force {
            if let Some(snapshot) = self.load()? {
                let age = snapshot.age_secs();
                if age >= 0 && (age as u64) < ttl_secs {
                    tracing::debug!(age, "serving cached stats snapshot");
                    return Ok(snapshot);
                }
            }
        }

        let snapshot = StatsSnapshot::compute(records);
        self.store(&snapshot)?;
        Ok(snapshot)
    }

    fn load(&self) -> Result<Option<StatsSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read stats cache: {}", self.path.display()))?;

        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt stats cache: {}", self.path.display()))?;

        Ok(Some(snapshot))
    }

    fn store(&self, snapshot: &StatsSnapshot) -> Result<()> {
        let content =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize stats")?;
        crate::write_atomic(&self.path, &content)
    }
}
