//! Running search statistics
//!
//! Incrementally maintained aggregates over every executed query: totals,
//! incremental means, per-term counts and hour-of-day / calendar-day
//! histograms. Persisted as a JSON sidecar like the history; a corrupt file
//! resets to defaults at load time.

use crate::history::write_atomic;
use chrono::{DateTime, Timelike, Utc};
use inkstone_core::error::{Error, Result};
use inkstone_core::search_types::SearchStatistics;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Maintains and persists [`SearchStatistics`]
pub struct StatisticsTracker {
    stats: SearchStatistics,
    path: Option<PathBuf>,
}

impl StatisticsTracker {
    /// Load statistics from a JSON file, falling back to defaults on failure
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stats = match read_stats(&path) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Resetting corrupt search statistics");
                SearchStatistics::default()
            }
        };

        StatisticsTracker {
            stats,
            path: Some(path),
        }
    }

    /// Ephemeral tracker with no persistence
    pub fn in_memory() -> Self {
        StatisticsTracker {
            stats: SearchStatistics::default(),
            path: None,
        }
    }

    /// Fold one query execution into the aggregates
    pub fn record(
        &mut self,
        query_terms: &[String],
        result_count: usize,
        execution_time_ms: f64,
        now: DateTime<Utc>,
    ) {
        self.stats.total_searches += 1;
        self.stats.total_results += result_count as u64;

        let n = self.stats.total_searches as f64;
        self.stats.average_results_per_search +=
            (result_count as f64 - self.stats.average_results_per_search) / n;
        self.stats.average_execution_time_ms +=
            (execution_time_ms - self.stats.average_execution_time_ms) / n;

        for term in query_terms {
            *self.stats.term_counts.entry(term.clone()).or_insert(0) += 1;
        }

        *self.stats.searches_by_hour.entry(now.hour()).or_insert(0) += 1;
        *self
            .stats
            .searches_by_day
            .entry(now.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;

        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist search statistics");
        }
    }

    /// Current aggregate values
    pub fn snapshot(&self) -> SearchStatistics {
        self.stats.clone()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.stats)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        write_atomic(path, &json)
    }
}

fn read_stats(path: &Path) -> Result<SearchStatistics> {
    if !path.exists() {
        return Ok(SearchStatistics::default());
    }
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Serialization(e.to_string()))
}
