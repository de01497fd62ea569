//! Read path over the index store
//!
//! Given a raw query string the engine tokenizes it, resolves candidate
//! documents through the posting table and returns ranked hits. Ranking is
//! (distinct query-term match count desc, summed frequency desc, updated_at
//! desc): coverage of the query beats raw term repetition, and recency is the
//! final tie-break. Truncation to the limit happens after ranking, never
//! before.

use crate::tokenizer::tokenize_unique;
use inkstone_core::error::{Error, Result};
use inkstone_core::search_types::{HitMetadata, SearchHit};
use inkstone_core::types::IndexedDocument;
use inkstone_store::IndexStore;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

// ============================================================================
// Deadline
// ============================================================================

/// Wall-clock budget for one query
///
/// Cancellation is cooperative: the engine checks the deadline between
/// per-term lookups, so worst-case overshoot is one posting scan.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline expiring `budget` from now
    pub fn after(budget: Duration) -> Self {
        Deadline {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Error if the deadline has passed
    pub fn check(&self) -> Result<()> {
        if Instant::now() >= self.at {
            Err(Error::QueryTimeout(self.budget))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// QueryEngine
// ============================================================================

#[derive(Debug, Default)]
struct Candidate {
    /// Distinct query terms this document matched
    matched_terms: u32,
    /// Summed posting frequency across matched terms
    frequency: u64,
}

/// Ranked retrieval over the index store
pub struct QueryEngine {
    store: Arc<IndexStore>,
    max_query_len: usize,
}

impl QueryEngine {
    /// Create an engine over a store handle
    pub fn new(store: Arc<IndexStore>, max_query_len: usize) -> Self {
        QueryEngine {
            store,
            max_query_len,
        }
    }

    /// Ranked hits for a raw query string
    ///
    /// An empty token set yields an empty result, not an error. Over-long
    /// queries are truncated to `max_query_len` characters before
    /// tokenization rather than rejected.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        deadline: Option<Deadline>,
    ) -> Result<Vec<SearchHit>> {
        let query = truncate_chars(query, self.max_query_len);
        let terms = tokenize_unique(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // OR semantics: a document matching any query term is a candidate.
        // Per query term, a document counts once toward matched_terms even
        // when the term is contained in several of its indexed terms.
        let mut candidates: FxHashMap<String, Candidate> = FxHashMap::default();
        for term in &terms {
            if let Some(deadline) = &deadline {
                deadline.check()?;
            }

            let mut per_doc: FxHashMap<String, u64> = FxHashMap::default();
            for (_, document_id, posting) in self.store.postings_containing(term) {
                *per_doc.entry(document_id).or_insert(0) += posting.frequency as u64;
            }
            for (document_id, frequency) in per_doc {
                let candidate = candidates.entry(document_id).or_default();
                candidate.matched_terms += 1;
                candidate.frequency += frequency;
            }
        }

        let mut ranked: Vec<(Candidate, IndexedDocument)> = candidates
            .into_iter()
            .filter_map(|(document_id, candidate)| {
                self.store.metadata(&document_id).map(|meta| (candidate, meta))
            })
            .collect();

        // The full candidate set is ranked before truncation
        ranked.sort_by(|a, b| {
            b.0.matched_terms
                .cmp(&a.0.matched_terms)
                .then_with(|| b.0.frequency.cmp(&a.0.frequency))
                .then_with(|| b.1.updated_at.cmp(&a.1.updated_at))
                .then_with(|| a.1.document_id.cmp(&b.1.document_id))
        });
        ranked.truncate(limit);

        debug!(query = %query, terms = terms.len(), hits = ranked.len(), "Query executed");

        Ok(ranked
            .into_iter()
            .map(|(candidate, meta)| SearchHit {
                document_id: meta.document_id.clone(),
                title: meta.title.clone(),
                content_preview: String::new(),
                relevance_score: candidate.frequency as f64,
                matches: Vec::new(),
                metadata: HitMetadata {
                    document_type: meta.document_type,
                    project_id: meta.project_id,
                    word_count: meta.term_count,
                    created_at: meta.created_at,
                    updated_at: meta.updated_at,
                },
            })
            .collect())
    }
}

/// Truncate to a character count without splitting a char
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;
    use chrono::{TimeZone, Utc};
    use inkstone_core::types::Document;

    fn setup() -> (Arc<IndexStore>, Indexer, QueryEngine) {
        let store = Arc::new(IndexStore::in_memory());
        let indexer = Indexer::new(Arc::clone(&store));
        let engine = QueryEngine::new(Arc::clone(&store), 256);
        (store, indexer, engine)
    }

    fn doc_updated_at(id: &str, title: &str, content: &str, day: u32) -> Document {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Document::new(id, title, content).with_timestamps(ts, ts)
    }

    #[test]
    fn test_empty_query_yields_empty_result() {
        let (_, _, engine) = setup();
        assert!(engine.search("", 10, None).unwrap().is_empty());
        assert!(engine.search("...!!!", 10, None).unwrap().is_empty());
    }

    #[test]
    fn test_unindexed_corpus_yields_no_results() {
        let (_, _, engine) = setup();
        assert!(engine.search("dragon", 10, None).unwrap().is_empty());
    }

    #[test]
    fn test_single_term_ordered_by_frequency_then_recency() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("low", "Low", "dragon", 5))
            .unwrap();
        indexer
            .index(&doc_updated_at("high", "High", "dragon dragon dragon", 1))
            .unwrap();
        indexer
            .index(&doc_updated_at("recent", "Recent", "dragon", 9))
            .unwrap();

        let hits = engine.search("dragon", 10, None).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document_id.as_str()).collect();
        // Frequency first, then updated_at breaks the tie between the two
        // single-occurrence documents
        assert_eq!(ids, vec!["high", "recent", "low"]);
    }

    #[test]
    fn test_multi_term_ranking_triple() {
        let (_, indexer, engine) = setup();
        // match_count 2, summed frequency 5
        indexer
            .index(&doc_updated_at(
                "both-low",
                "A",
                "dragon cave dragon cave dragon",
                1,
            ))
            .unwrap();
        // match_count 2, summed frequency 10
        indexer
            .index(&doc_updated_at(
                "both-high",
                "B",
                &"dragon cave ".repeat(5),
                1,
            ))
            .unwrap();
        // match_count 1, frequency 100
        indexer
            .index(&doc_updated_at("one-term", "C", &"dragon ".repeat(100), 1))
            .unwrap();

        let hits = engine.search("dragon cave", 10, None).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document_id.as_str()).collect();
        // match_count desc, then frequency desc: raw repetition never beats
        // query coverage
        assert_eq!(ids, vec!["both-high", "both-low", "one-term"]);
    }

    #[test]
    fn test_multi_term_recency_tiebreak() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("older", "A", "dragon cave", 1))
            .unwrap();
        indexer
            .index(&doc_updated_at("newer", "B", "dragon cave", 8))
            .unwrap();

        let hits = engine.search("dragon cave", 10, None).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document_id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }

    #[test]
    fn test_or_semantics() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("d1", "A", "only dragon here", 1))
            .unwrap();
        indexer
            .index(&doc_updated_at("d2", "B", "only cave here", 1))
            .unwrap();

        let hits = engine.search("dragon cave", 10, None).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_substring_term_match() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("d1", "Notes", "No dragons here, just cats.", 1))
            .unwrap();

        let hits = engine.search("dragon", 10, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "d1");
    }

    #[test]
    fn test_limit_applied_after_ranking() {
        let (_, indexer, engine) = setup();
        for i in 0..10 {
            let content = "dragon ".repeat(i + 1);
            indexer
                .index(&doc_updated_at(&format!("d{i}"), "T", &content, 1))
                .unwrap();
        }

        let hits = engine.search("dragon", 3, None).unwrap();
        assert_eq!(hits.len(), 3);
        // Highest-frequency documents survive truncation
        assert_eq!(hits[0].document_id, "d9");
        assert_eq!(hits[1].document_id, "d8");
        assert_eq!(hits[2].document_id, "d7");
    }

    #[test]
    fn test_zero_posting_term_contributes_nothing() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("d1", "A", "dragon", 1))
            .unwrap();

        let hits = engine.search("dragon zzzzxq", 10, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance_score, 1.0);
    }

    #[test]
    fn test_overlong_query_is_truncated_not_rejected() {
        let store = Arc::new(IndexStore::in_memory());
        let indexer = Indexer::new(Arc::clone(&store));
        let engine = QueryEngine::new(Arc::clone(&store), 6);
        indexer
            .index(&doc_updated_at("d1", "A", "dragon", 1))
            .unwrap();

        // Truncated to "dragon" at 6 characters
        let hits = engine.search("dragonfire breath", 10, None).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_expired_deadline_surfaces_timeout() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("d1", "A", "dragon", 1))
            .unwrap();

        let deadline = Deadline::after(Duration::ZERO);
        let err = engine.search("dragon", 10, Some(deadline)).unwrap_err();
        assert!(matches!(err, Error::QueryTimeout(_)));
    }

    #[test]
    fn test_generous_deadline_passes() {
        let (_, indexer, engine) = setup();
        indexer
            .index(&doc_updated_at("d1", "A", "dragon", 1))
            .unwrap();

        let deadline = Deadline::after(Duration::from_secs(60));
        assert_eq!(engine.search("dragon", 10, Some(deadline)).unwrap().len(), 1);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("héllo", 50), "héllo");
        assert_eq!(truncate_chars("", 3), "");
    }
}
