//! Search history
//!
//! A bounded most-recent-first list of executed queries, deduplicated by
//! exact query text: a repeated query moves to the front instead of
//! appending. Persisted as a JSON sidecar file written atomically after each
//! mutation; a corrupt file resets to empty at load time instead of failing
//! startup.

use inkstone_core::error::{Error, Result};
use inkstone_core::search_types::{SearchHistoryEntry, SearchOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bounded, persistent query history
pub struct SearchHistory {
    entries: Vec<SearchHistoryEntry>,
    max_entries: usize,
    path: Option<PathBuf>,
}

impl SearchHistory {
    /// Load history from a JSON file, falling back to empty on any failure
    pub fn load(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Resetting corrupt search history");
                Vec::new()
            }
        };

        SearchHistory {
            entries,
            max_entries,
            path: Some(path),
        }
    }

    /// Ephemeral history with no persistence
    pub fn in_memory(max_entries: usize) -> Self {
        SearchHistory {
            entries: Vec::new(),
            max_entries,
            path: None,
        }
    }

    /// Record a query execution
    ///
    /// Exact-duplicate query text moves to the front carrying the fresh
    /// result count; the list is then capped and persisted. Persistence
    /// failures are logged, never escalated to the caller.
    pub fn record(
        &mut self,
        query: &str,
        options: &SearchOptions,
        result_count: usize,
        execution_time_ms: f64,
    ) {
        self.entries.retain(|e| e.query != query);
        self.entries.insert(
            0,
            SearchHistoryEntry::new(query, options.clone(), result_count, execution_time_ms),
        );
        self.entries.truncate(self.max_entries);

        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist search history");
        }
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and persist the empty list
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist cleared search history");
        }
        debug!("Search history cleared");
    }

    /// Past queries starting with `prefix`, case-insensitively, newest first
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        if prefix.trim().is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.query.to_lowercase().starts_with(&prefix))
            .map(|e| e.query.clone())
            .take(limit)
            .collect()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        write_atomic(path, &json)
    }
}

fn read_entries(path: &Path) -> Result<Vec<SearchHistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Serialization(e.to_string()))
}

/// Atomic sidecar write: temp file + rename
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, bytes)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }
    Ok(())
}
