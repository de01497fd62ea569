//! Engine configuration
//!
//! All tunables from the outer boundary live here with named defaults,
//! consumed as one configuration object rather than scattered constants.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the search engine and orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// How long cached query results stay valid
    pub cache_ttl: Duration,
    /// Queries longer than this (in characters) are truncated, not rejected
    pub max_query_len: usize,
    /// Maximum retained history entries
    pub max_history: usize,
    /// Result limit when the caller does not pass one
    pub default_limit: usize,
    /// Leading/trailing context lines attached to each match span
    pub context_lines: usize,
    /// Character width of the content preview window
    pub preview_window: usize,
    /// Master switch for fuzzy query expansion
    pub fuzzy_enabled: bool,
    /// Wall-clock deadline for a single query; `None` disables the timeout
    pub query_timeout: Option<Duration>,
    /// Drop all cached results on successful index/remove/rebuild
    ///
    /// Off by default: bounded staleness up to `cache_ttl` is the accepted
    /// trade-off for a simple write path.
    pub invalidate_cache_on_write: bool,
    /// How many top query terms the statistics report
    pub top_terms_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            cache_ttl: Duration::from_secs(300),
            max_query_len: 256,
            max_history: 100,
            default_limit: 100,
            context_lines: 2,
            preview_window: 200,
            fuzzy_enabled: true,
            query_timeout: None,
            invalidate_cache_on_write: false,
            top_terms_limit: 10,
        }
    }
}

impl SearchConfig {
    /// Builder: set cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Builder: set query timeout
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Builder: set maximum history size
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// Builder: set default result limit
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Builder: enable cache invalidation on the write path
    pub fn with_invalidate_cache_on_write(mut self, enabled: bool) -> Self {
        self.invalidate_cache_on_write = enabled;
        self
    }

    /// Builder: set the fuzzy expansion master switch
    pub fn with_fuzzy_enabled(mut self, enabled: bool) -> Self {
        self.fuzzy_enabled = enabled;
        self
    }
}
