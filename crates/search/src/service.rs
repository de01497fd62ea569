//! Query orchestration
//!
//! [`SearchService`] drives the query engine and layers on everything the
//! caller-facing boundary needs: result caching, snippet and highlight
//! generation, post-ranking filters, history, statistics, fuzzy expansion,
//! suggestions and the optional query timeout. The write path (index,
//! remove, rebuild) passes through to the indexer.

use crate::cache::ResultCache;
use crate::engine::{Deadline, QueryEngine};
use crate::fuzzy;
use crate::highlight::{self, QueryMatcher};
use crate::history::SearchHistory;
use crate::indexer::{IndexOutcome, Indexer, RebuildReport};
use crate::stats::StatisticsTracker;
use crate::tokenizer::tokenize_unique;
use chrono::Utc;
use inkstone_core::config::SearchConfig;
use inkstone_core::error::Result;
use inkstone_core::search_types::{
    IndexStatistics, IndexStatus, SearchFilter, SearchHistoryEntry, SearchHit, SearchOptions,
    SearchResponse, SearchStatistics,
};
use inkstone_core::traits::ContentProvider;
use inkstone_core::types::Document;
use inkstone_store::IndexStore;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// History sidecar file name under the data directory
const HISTORY_FILE: &str = "search_history.json";
/// Statistics sidecar file name under the data directory
const STATS_FILE: &str = "search_stats.json";

/// Service-level search orchestrator
pub struct SearchService {
    store: Arc<IndexStore>,
    indexer: Indexer,
    engine: QueryEngine,
    cache: ResultCache,
    history: RwLock<SearchHistory>,
    stats: RwLock<StatisticsTracker>,
    provider: Arc<dyn ContentProvider>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a service with ephemeral history and statistics
    pub fn new(
        store: Arc<IndexStore>,
        provider: Arc<dyn ContentProvider>,
        config: SearchConfig,
    ) -> Self {
        let history = SearchHistory::in_memory(config.max_history);
        let stats = StatisticsTracker::in_memory();
        Self::build(store, provider, config, history, stats)
    }

    /// Create a service persisting history and statistics under `data_dir`
    ///
    /// Corrupt sidecar files reset to empty state; they never fail startup.
    pub fn with_data_dir(
        store: Arc<IndexStore>,
        provider: Arc<dyn ContentProvider>,
        config: SearchConfig,
        data_dir: &Path,
    ) -> Self {
        let history = SearchHistory::load(data_dir.join(HISTORY_FILE), config.max_history);
        let stats = StatisticsTracker::load(data_dir.join(STATS_FILE));
        Self::build(store, provider, config, history, stats)
    }

    fn build(
        store: Arc<IndexStore>,
        provider: Arc<dyn ContentProvider>,
        config: SearchConfig,
        history: SearchHistory,
        stats: StatisticsTracker,
    ) -> Self {
        SearchService {
            indexer: Indexer::new(Arc::clone(&store)),
            engine: QueryEngine::new(Arc::clone(&store), config.max_query_len),
            cache: ResultCache::new(config.cache_ttl),
            history: RwLock::new(history),
            stats: RwLock::new(stats),
            store,
            provider,
            config,
        }
    }

    // ========================================================================
    // Query path
    // ========================================================================

    /// Execute a query and return ranked, filtered, highlighted hits
    ///
    /// Filters apply strictly after ranking and never alter scores. A blank
    /// query returns an empty response without touching history or
    /// statistics. Errors (timeout, storage, invalid pattern) surface as
    /// `Err`; the caller is never handed a silently truncated result set.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
        filter: &SearchFilter,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        let started = Instant::now();
        let limit = limit.unwrap_or(self.config.default_limit);

        if query.trim().is_empty() {
            return Ok(self.response(Vec::new(), started));
        }

        let deadline = self.config.query_timeout.map(Deadline::after);

        // Fuzzy expansion of a regex pattern is meaningless; the regex path
        // always searches the pattern as-is
        let fuzzy = options.fuzzy && self.config.fuzzy_enabled && !options.use_regex;
        let hits = if fuzzy {
            self.fuzzy_hits(query, options, limit, deadline)?
        } else {
            self.ranked_hits(query, options, limit, deadline)?
        };

        let hits: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| filter.matches(&hit.metadata))
            .collect();

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.history
            .write()
            .record(query, options, hits.len(), elapsed_ms);
        self.stats
            .write()
            .record(&tokenize_unique(query), hits.len(), elapsed_ms, Utc::now());

        info!(
            query = %query,
            hits = hits.len(),
            fuzzy,
            elapsed_ms,
            "Search completed"
        );
        Ok(self.response(hits, started))
    }

    /// Cached engine execution with snippets attached
    ///
    /// Cached entries are keyed by normalized query text, match-mode options
    /// and limit, and carry their snippets, so a hit is returned unchanged
    /// until TTL expiry. The matcher compiles before the cache lookup: an
    /// unparseable pattern fails fast and is never masked by a cached entry
    /// for the same text under other options.
    fn ranked_hits(
        &self,
        query: &str,
        options: &SearchOptions,
        limit: usize,
        deadline: Option<Deadline>,
    ) -> Result<Vec<SearchHit>> {
        let matcher = QueryMatcher::new(query.trim(), options)?;

        if let Some(hits) = self.cache.get(query, options, limit) {
            return Ok(hits);
        }

        let mut hits = self.engine.search(query, limit, deadline)?;

        for hit in &mut hits {
            self.attach_snippets(hit, &matcher, options);
        }

        self.cache.put(query, options, limit, hits.clone());
        Ok(hits)
    }

    /// Union of per-variant searches, deduplicated by document id
    fn fuzzy_hits(
        &self,
        query: &str,
        options: &SearchOptions,
        limit: usize,
        deadline: Option<Deadline>,
    ) -> Result<Vec<SearchHit>> {
        let variants = fuzzy::expand(query.trim());
        let mut best: FxHashMap<String, SearchHit> = FxHashMap::default();

        for variant in &variants {
            for hit in self.ranked_hits(variant, options, limit, deadline)? {
                match best.get(&hit.document_id) {
                    Some(existing) if existing.relevance_score >= hit.relevance_score => {}
                    _ => {
                        best.insert(hit.document_id.clone(), hit);
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = best.into_values().collect();
        hits.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    /// Pull content back through the provider and build preview + spans
    ///
    /// A vanished document degrades to an empty preview; a provider failure
    /// is logged and degrades the same way rather than failing the query.
    fn attach_snippets(&self, hit: &mut SearchHit, matcher: &QueryMatcher, options: &SearchOptions) {
        let content = match self.provider.content(&hit.document_id) {
            Ok(Some(content)) => content,
            Ok(None) => return,
            Err(e) => {
                warn!(document_id = %hit.document_id, error = %e, "Content lookup failed");
                return;
            }
        };

        hit.content_preview =
            highlight::content_preview(&content.content, matcher, self.config.preview_window);
        hit.matches = highlight::line_matches(
            &content.content,
            matcher,
            self.config.context_lines,
            options.include_context,
        );
    }

    fn response(&self, hits: Vec<SearchHit>, started: Instant) -> SearchResponse {
        SearchResponse {
            total_count: hits.len(),
            hits,
            search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            statistics: self.stats.read().snapshot(),
        }
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Index one document
    pub fn index_document(&self, document: &Document) -> Result<IndexOutcome> {
        let outcome = self.indexer.index(document)?;
        if self.config.invalidate_cache_on_write && outcome == IndexOutcome::Indexed {
            self.cache.invalidate_all();
        }
        Ok(outcome)
    }

    /// Remove one document from the index; idempotent
    pub fn remove_document(&self, document_id: &str) -> Result<bool> {
        let existed = self.indexer.remove(document_id)?;
        if self.config.invalidate_cache_on_write && existed {
            self.cache.invalidate_all();
        }
        Ok(existed)
    }

    /// Clear and re-index the whole corpus
    pub fn rebuild(&self, documents: &[Document]) -> Result<RebuildReport> {
        let report = self.indexer.rebuild(documents)?;
        if self.config.invalidate_cache_on_write {
            self.cache.invalidate_all();
        }
        Ok(report)
    }

    // ========================================================================
    // Suggestions
    // ========================================================================

    /// Indexed terms starting with `prefix`, lexicographic order
    pub fn term_suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.store.terms_with_prefix(&prefix, limit)
    }

    /// Past queries starting with `prefix`, newest first
    pub fn history_suggestions(&self, prefix: &str, limit: usize) -> Vec<String> {
        self.history.read().suggestions(prefix, limit)
    }

    // ========================================================================
    // History / statistics / status
    // ========================================================================

    /// Most recent history entries, newest first
    pub fn history(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        self.history.read().recent(limit)
    }

    /// Drop all history entries
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Snapshot of the running query statistics
    pub fn statistics(&self) -> SearchStatistics {
        self.stats.read().snapshot()
    }

    /// Occupancy and freshness of the index store
    pub fn status(&self) -> IndexStatus {
        self.store.status()
    }

    /// Aggregates from a full metadata scan
    pub fn index_statistics(&self) -> IndexStatistics {
        self.store.statistics()
    }
}
