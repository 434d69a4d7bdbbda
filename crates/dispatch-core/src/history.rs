//! Routing history - append-only JSON log of dispatch decisions
//!
//! Stored as a single JSON document at ~/.local/share/dispatch/history.json:
//! `{ version, created_at, records: [...] }` with the newest record first
//! and at most 1000 records retained. The file is rewritten wholesale
//! through a temp-file rename. Corrupt JSON surfaces as an error; it is
//! never silently repaired.

use crate::paths::Paths;
use crate::score::Recommendation;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Most records retained; older entries are evicted past this point
pub const HISTORY_CAP: usize = 1000;

/// Current history document version
const HISTORY_VERSION: u32 = 1;

/// The rule a routing decision came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedRule {
    pub id: String,
    pub name: String,
}

/// One routing decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub task: String,
    pub matched_rule: Option<MatchedRule>,
    pub recommendations: Vec<Recommendation>,
    pub selected_tool: Option<String>,
    pub successful: bool,
}

impl HistoryRecord {
    /// Build a record; the store assigns the id on append
    pub fn new(
        task: &str,
        matched_rule: Option<MatchedRule>,
        recommendations: Vec<Recommendation>,
        selected_tool: Option<String>,
        successful: bool,
    ) -> Self {
        Self {
            id: 0,
            timestamp: Utc::now(),
            task: task.to_string(),
            matched_rule,
            recommendations,
            selected_tool,
            successful,
        }
    }
}

/// On-disk history document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    created_at: DateTime<Utc>,
    records: Vec<HistoryRecord>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION,
            created_at: Utc::now(),
            records: Vec::new(),
        }
    }
}

/// History store bound to one file path
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store at the default location, creating the data directory
    pub fn new() -> Result<Self> {
        let paths = Paths::new();
        fs::create_dir_all(&paths.data)
            .with_context(|| format!("Failed to create data directory: {}", paths.data.display()))?;
        Ok(Self::at(&paths.history_file()))
    }

    /// Store at a specific path
    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// All records, newest first
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.load_file()?.records)
    }

    /// The newest `limit` records
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let mut records = self.load()?;
        records.truncate(limit);
        Ok(records)
    }

    /// Append a record: assign the next id, insert at the front, evict
    /// past the cap, rewrite the file
    pub fn append(&self, mut record: HistoryRecord) -> Result<HistoryRecord> {
        let mut file = self.load_file()?;

        record.id = file.records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        file.records.insert(0, record.clone());
        file.records.truncate(HISTORY_CAP);

        self.write(&file)?;
        tracing::debug!(id = record.id, "history record appended");
        Ok(record)
    }

    /// Delete all history
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove history: {}", self.path.display()))?;
        }
        Ok(())
    }

    fn load_file(&self) -> Result<HistoryFile> {
        if !self.path.exists() {
            return Ok(HistoryFile::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history: {}", self.path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt history file: {}", self.path.display()))
    }

    fn write(&self, file: &HistoryFile) -> Result<()> {
        let content =
            serde_json::to_string_pretty(file).context("Failed to serialize history")?;
        crate::write_atomic(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(task: &str, successful: bool) -> HistoryRecord {
        HistoryRecord::new(task, None, Vec::new(), Some("aichat".into()), successful)
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(&dir.path().join("history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_assigns_increasing_ids_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(&dir.path().join("history.json"));

        let first = store.append(record("first", true)).unwrap();
        let second = store.append(record("second", true)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].task, "second");
        assert_eq!(records[1].task, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(&dir.path().join("history.json"));

        // Pre-build a full file so the test does not rewrite 1000 times
        let mut file = HistoryFile::default();
        for id in 1..=HISTORY_CAP as u64 {
            let mut r = record(&format!("task {}", id), true);
            r.id = id;
            file.records.insert(0, r);
        }
        store.write(&file).unwrap();

        let appended = store.append(record("newest", true)).unwrap();
        assert_eq!(appended.id, HISTORY_CAP as u64 + 1);

        let records = store.load().unwrap();
        assert_eq!(records.len(), HISTORY_CAP);
        assert_eq!(records[0].task, "newest");
        // The oldest record (id 1) is gone
        assert!(records.iter().all(|r| r.id != 1));
    }

    #[test]
    fn test_recent_limits() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(&dir.path().join("history.json"));

        for i in 0..5 {
            store.append(record(&format!("task {}", i), true)).unwrap();
        }

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].task, "task 4");
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json at all").unwrap();

        let store = HistoryStore::at(&path);
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Corrupt history file"));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(&dir.path().join("history.json"));

        store.append(record("task", true)).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
