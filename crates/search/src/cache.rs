//! Time-bounded query result cache
//!
//! Memoizes ranked hits keyed by normalized query text, the match-mode
//! options and the result limit: the same text searched under different
//! options (regex, whole words, case sensitivity) carries different snippets
//! and must never share an entry. Entries expire after a fixed TTL measured
//! from insertion; expired entries are evicted lazily on the next lookup,
//! never swept proactively. The write path does not invalidate this cache
//! unless the engine is configured to, so a just-written document may stay
//! invisible to a repeated identical query for up to one TTL window.

use dashmap::DashMap;
use inkstone_core::search_types::{SearchHit, SearchOptions};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    options: SearchOptions,
    limit: usize,
}

impl CacheKey {
    fn new(query: &str, options: &SearchOptions, limit: usize) -> Self {
        CacheKey {
            query: query.trim().to_lowercase(),
            options: options.clone(),
            limit,
        }
    }
}

struct CacheEntry {
    hits: Vec<SearchHit>,
    inserted_at: Instant,
}

/// TTL-bounded memoization layer in front of the query engine
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache with the given entry TTL
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached hits for `(query, options, limit)`, or `None` on miss/expiry
    pub fn get(
        &self,
        query: &str,
        options: &SearchOptions,
        limit: usize,
    ) -> Option<Vec<SearchHit>> {
        let key = CacheKey::new(query, options, limit);

        let expired = match self.entries.get(&key) {
            Some(entry) => {
                if entry.inserted_at.elapsed() < self.ttl {
                    debug!(query = %key.query, limit, "Result cache hit");
                    return Some(entry.hits.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(&key);
        }
        None
    }

    /// Store hits for `(query, options, limit)`
    pub fn put(&self, query: &str, options: &SearchOptions, limit: usize, hits: Vec<SearchHit>) {
        let key = CacheKey::new(query, options, limit);
        self.entries.insert(
            key,
            CacheEntry {
                hits,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of live entries (expired entries linger until looked up)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
