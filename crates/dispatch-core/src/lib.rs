//! dispatch-core - Shared functionality for the dispatch tool router
//!
//! Routing is a linear scan: load the catalog and rules, match the task
//! against keyword rules, score the candidates, rank them. Everything
//! else in this crate is storage glue around that scan.

pub mod catalog;
pub mod config;
pub mod history;
pub mod matcher;
pub mod paths;
pub mod presence;
pub mod rules;
pub mod score;
pub mod stats;
pub mod template;

pub use catalog::{Catalog, Tool, ToolCategory};
pub use config::Config;
pub use paths::Paths;
pub use rules::{Rule, RuleSet};
pub use score::Recommendation;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Write a file transactionally: temp file in the same directory, then
/// rename over the original.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.json");

        write_atomic(&target, "{}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.json");

        write_atomic(&target, "old").unwrap();
        write_atomic(&target, "new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }
}
