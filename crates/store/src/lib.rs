//! Persistent index store for inkstone
//!
//! This crate provides:
//! - [`IndexStore`], the durable inverted-index tables (document metadata +
//!   term posting lists)
//! - The CRC-checked binary snapshot format in [`snapshot`]
//!
//! # Concurrency
//!
//! One reader-writer lock guards the tables per store instance. All mutating
//! operations for a single document id are applied as one unit under the
//! write lock and persisted before the lock is released, so a reader never
//! observes postings without metadata or vice versa.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod snapshot;

use chrono::{DateTime, Utc};
use inkstone_core::error::Result;
use inkstone_core::search_types::{IndexStatistics, IndexStatus};
use inkstone_core::types::{IndexedDocument, Posting};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use snapshot::StoreSnapshot;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

// ============================================================================
// Tables
// ============================================================================

/// In-memory tables behind the lock
#[derive(Debug, Default)]
struct Tables {
    /// Document id -> metadata record
    metadata: FxHashMap<String, IndexedDocument>,
    /// Term -> document id -> posting; BTreeMap gives ordered prefix scans
    postings: BTreeMap<String, BTreeMap<String, Posting>>,
    /// Document id -> terms it appears under, for O(doc-terms) removal
    doc_terms: FxHashMap<String, Vec<String>>,
}

impl Tables {
    /// Drop every posting row and the metadata record for one document
    fn remove_document(&mut self, document_id: &str) -> bool {
        let existed = self.metadata.remove(document_id).is_some();
        if let Some(terms) = self.doc_terms.remove(document_id) {
            for term in terms {
                if let Some(docs) = self.postings.get_mut(&term) {
                    docs.remove(document_id);
                    if docs.is_empty() {
                        self.postings.remove(&term);
                    }
                }
            }
        }
        existed
    }

    fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            metadata: self
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            postings: self.postings.clone(),
        }
    }

    fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut doc_terms: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (term, docs) in &snapshot.postings {
            for document_id in docs.keys() {
                doc_terms
                    .entry(document_id.clone())
                    .or_default()
                    .push(term.clone());
            }
        }
        Tables {
            metadata: snapshot.metadata.into_iter().collect(),
            postings: snapshot.postings,
            doc_terms,
        }
    }
}

// ============================================================================
// IndexStore
// ============================================================================

/// Durable inverted-index store
///
/// Holds per-document metadata and the term -> document posting table,
/// persisted as one checksummed snapshot after every mutating operation.
/// Constructed either on disk ([`IndexStore::open`]) or ephemeral
/// ([`IndexStore::in_memory`]) for tests.
#[derive(Debug)]
pub struct IndexStore {
    tables: RwLock<Tables>,
    path: Option<PathBuf>,
}

impl IndexStore {
    /// Open a store backed by a snapshot file, creating it lazily
    ///
    /// A present but unreadable snapshot surfaces as
    /// [`inkstone_core::Error::Corruption`]; recovery is the caller's call
    /// (typically a `rebuild`).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let snapshot = snapshot::read(&path)?;
            let tables = Tables::from_snapshot(snapshot);
            info!(
                path = %path.display(),
                documents = tables.metadata.len(),
                terms = tables.postings.len(),
                "Index store loaded"
            );
            tables
        } else {
            debug!(path = %path.display(), "Starting with empty index store");
            Tables::default()
        };

        Ok(IndexStore {
            tables: RwLock::new(tables),
            path: Some(path),
        })
    }

    /// Create an ephemeral store with no persistence
    pub fn in_memory() -> Self {
        IndexStore {
            tables: RwLock::new(Tables::default()),
            path: None,
        }
    }

    /// Persist the given tables; no-op for in-memory stores
    ///
    /// Called while the write lock is held so commits are serialized.
    fn commit(&self, tables: &Tables) -> Result<()> {
        if let Some(path) = &self.path {
            snapshot::write_atomic(path, &tables.to_snapshot())?;
        }
        Ok(())
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Replace the metadata record and all postings for one document
    ///
    /// The previous posting rows for the id are dropped first; postings are
    /// replaced, never merged. Metadata and postings land as one unit.
    pub fn apply_document(
        &self,
        meta: IndexedDocument,
        postings: Vec<(String, Posting)>,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        let document_id = meta.document_id.clone();

        tables.remove_document(&document_id);

        let mut terms = Vec::with_capacity(postings.len());
        for (term, posting) in postings {
            tables
                .postings
                .entry(term.clone())
                .or_default()
                .insert(document_id.clone(), posting);
            terms.push(term);
        }
        tables.doc_terms.insert(document_id.clone(), terms);
        tables.metadata.insert(document_id, meta);

        self.commit(&tables)
    }

    /// Remove all rows for a document id
    ///
    /// Idempotent: removing an unknown id is `Ok(false)`, not an error.
    pub fn remove_document(&self, document_id: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        let existed = tables.remove_document(document_id);
        if existed {
            self.commit(&tables)?;
        }
        Ok(existed)
    }

    /// Drop every row in the store
    pub fn clear(&self) -> Result<()> {
        let mut tables = self.tables.write();
        *tables = Tables::default();
        self.commit(&tables)
    }

    // ========================================================================
    // Read path
    // ========================================================================

    /// Metadata record for a document id, if indexed
    pub fn metadata(&self, document_id: &str) -> Option<IndexedDocument> {
        self.tables.read().metadata.get(document_id).cloned()
    }

    /// Postings for an exact term
    pub fn postings_for_term(&self, term: &str) -> Vec<(String, Posting)> {
        self.tables
            .read()
            .postings
            .get(term)
            .map(|docs| {
                docs.iter()
                    .map(|(id, p)| (id.clone(), p.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Postings for every indexed term containing `fragment` as a substring
    ///
    /// Returns `(term, document_id, posting)` rows; the query engine
    /// aggregates per document. This is the candidate-resolution primitive:
    /// a query token matches any term it is contained in, so "dragon" finds
    /// "dragons" too.
    pub fn postings_containing(&self, fragment: &str) -> Vec<(String, String, Posting)> {
        let tables = self.tables.read();
        let mut rows = Vec::new();
        for (term, docs) in &tables.postings {
            if term.contains(fragment) {
                for (document_id, posting) in docs {
                    rows.push((term.clone(), document_id.clone(), posting.clone()));
                }
            }
        }
        rows
    }

    /// Distinct indexed terms starting with `prefix`, in lexicographic order
    pub fn terms_with_prefix(&self, prefix: &str, limit: usize) -> Vec<String> {
        let tables = self.tables.read();
        tables
            .postings
            .range(prefix.to_string()..)
            .take_while(|(term, _)| term.starts_with(prefix))
            .take(limit)
            .map(|(term, _)| term.clone())
            .collect()
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.tables.read().metadata.len()
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.tables.read().postings.len()
    }

    // ========================================================================
    // Observability
    // ========================================================================

    /// Occupancy and freshness of the store
    pub fn status(&self) -> IndexStatus {
        let tables = self.tables.read();
        let last_indexed_at: Option<DateTime<Utc>> =
            tables.metadata.values().map(|m| m.indexed_at).max();
        let size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        IndexStatus {
            document_count: tables.metadata.len(),
            term_count: tables.postings.len(),
            size_bytes,
            last_indexed_at,
        }
    }

    /// Full metadata scan for aggregate statistics
    pub fn statistics(&self) -> IndexStatistics {
        let tables = self.tables.read();
        let document_count = tables.metadata.len();
        let total_terms: u64 = tables.metadata.values().map(|m| m.term_count as u64).sum();

        let mut documents_by_type = std::collections::HashMap::new();
        for meta in tables.metadata.values() {
            *documents_by_type
                .entry(meta.document_type.as_str().to_string())
                .or_insert(0u64) += 1;
        }

        IndexStatistics {
            document_count,
            distinct_terms: tables.postings.len(),
            average_terms_per_document: if document_count == 0 {
                0.0
            } else {
                total_terms as f64 / document_count as f64
            },
            documents_by_type,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_core::types::DocumentType;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn meta(document_id: &str, content_hash: u64) -> IndexedDocument {
        IndexedDocument {
            document_id: document_id.to_string(),
            title: format!("title of {document_id}"),
            content_hash,
            term_count: 3,
            document_type: DocumentType::Note,
            project_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            indexed_at: Utc::now(),
        }
    }

    fn postings(terms: &[(&str, Vec<u32>)]) -> Vec<(String, Posting)> {
        terms
            .iter()
            .map(|(term, positions)| (term.to_string(), Posting::from_positions(positions.clone())))
            .collect()
    }

    #[test]
    fn test_apply_and_lookup() {
        let store = IndexStore::in_memory();
        store
            .apply_document(
                meta("doc-1", 1),
                postings(&[("dragon", vec![0, 20]), ("cave", vec![7])]),
            )
            .unwrap();

        assert_eq!(store.document_count(), 1);
        assert_eq!(store.term_count(), 2);

        let rows = store.postings_for_term("dragon");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "doc-1");
        assert_eq!(rows[0].1.frequency, 2);

        assert!(store.postings_for_term("missing").is_empty());
    }

    #[test]
    fn test_apply_replaces_postings() {
        let store = IndexStore::in_memory();
        store
            .apply_document(meta("doc-1", 1), postings(&[("old", vec![0])]))
            .unwrap();
        store
            .apply_document(meta("doc-1", 2), postings(&[("new", vec![0])]))
            .unwrap();

        assert!(store.postings_for_term("old").is_empty());
        assert_eq!(store.postings_for_term("new").len(), 1);
        assert_eq!(store.term_count(), 1);
        assert_eq!(store.metadata("doc-1").unwrap().content_hash, 2);
    }

    #[test]
    fn test_remove_document_completeness() {
        let store = IndexStore::in_memory();
        store
            .apply_document(
                meta("doc-1", 1),
                postings(&[("dragon", vec![0]), ("cave", vec![7])]),
            )
            .unwrap();
        store
            .apply_document(meta("doc-2", 2), postings(&[("dragon", vec![3])]))
            .unwrap();

        assert!(store.remove_document("doc-1").unwrap());

        assert!(store.metadata("doc-1").is_none());
        assert!(store.postings_for_term("cave").is_empty());
        let rows = store.postings_for_term("dragon");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "doc-2");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let store = IndexStore::in_memory();
        assert!(!store.remove_document("ghost").unwrap());
    }

    #[test]
    fn test_postings_containing_substring() {
        let store = IndexStore::in_memory();
        store
            .apply_document(
                meta("doc-1", 1),
                postings(&[("dragons", vec![0]), ("dragonfly", vec![9]), ("cat", vec![20])]),
            )
            .unwrap();

        let rows = store.postings_containing("dragon");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(term, _, _)| term.contains("dragon")));
    }

    #[test]
    fn test_terms_with_prefix() {
        let store = IndexStore::in_memory();
        store
            .apply_document(
                meta("doc-1", 1),
                postings(&[
                    ("drab", vec![0]),
                    ("dragon", vec![5]),
                    ("dragons", vec![13]),
                    ("drum", vec![22]),
                ]),
            )
            .unwrap();

        assert_eq!(
            store.terms_with_prefix("dra", 10),
            vec!["drab", "dragon", "dragons"]
        );
        assert_eq!(store.terms_with_prefix("dra", 2).len(), 2);
        assert!(store.terms_with_prefix("xyz", 10).is_empty());
    }

    #[test]
    fn test_clear() {
        let store = IndexStore::in_memory();
        store
            .apply_document(meta("doc-1", 1), postings(&[("dragon", vec![0])]))
            .unwrap();
        store.clear().unwrap();

        assert_eq!(store.document_count(), 0);
        assert_eq!(store.term_count(), 0);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.snap");

        {
            let store = IndexStore::open(&path).unwrap();
            store
                .apply_document(
                    meta("doc-1", 1),
                    postings(&[("dragon", vec![0, 14]), ("cave", vec![7])]),
                )
                .unwrap();
        }

        let store = IndexStore::open(&path).unwrap();
        assert_eq!(store.document_count(), 1);
        let rows = store.postings_for_term("dragon");
        assert_eq!(rows[0].1.positions, vec![0, 14]);

        // Reverse map was rebuilt on load, so replacement still works
        store
            .apply_document(meta("doc-1", 2), postings(&[("castle", vec![0])]))
            .unwrap();
        assert!(store.postings_for_term("dragon").is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.snap");

        {
            let store = IndexStore::open(&path).unwrap();
            store
                .apply_document(meta("doc-1", 1), postings(&[("dragon", vec![0])]))
                .unwrap();
        }

        let mut bytes = std::fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let err = IndexStore::open(&path).unwrap_err();
        assert!(matches!(err, inkstone_core::Error::Corruption(_)));
    }

    #[test]
    fn test_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.snap");
        let store = IndexStore::open(&path).unwrap();

        let status = store.status();
        assert_eq!(status.document_count, 0);
        assert!(status.last_indexed_at.is_none());

        store
            .apply_document(meta("doc-1", 1), postings(&[("dragon", vec![0])]))
            .unwrap();

        let status = store.status();
        assert_eq!(status.document_count, 1);
        assert_eq!(status.term_count, 1);
        assert!(status.size_bytes > 0);
        assert!(status.last_indexed_at.is_some());
    }

    #[test]
    fn test_statistics() {
        let store = IndexStore::in_memory();
        let mut chapter = meta("doc-1", 1);
        chapter.document_type = DocumentType::Chapter;
        chapter.term_count = 10;
        let mut note = meta("doc-2", 2);
        note.term_count = 20;

        store
            .apply_document(chapter, postings(&[("dragon", vec![0])]))
            .unwrap();
        store
            .apply_document(note, postings(&[("cave", vec![0])]))
            .unwrap();

        let stats = store.statistics();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.distinct_terms, 2);
        assert!((stats.average_terms_per_document - 15.0).abs() < f64::EPSILON);
        assert_eq!(stats.documents_by_type["chapter"], 1);
        assert_eq!(stats.documents_by_type["note"], 1);
    }

    proptest! {
        #[test]
        fn prop_remove_leaves_no_orphan_postings(
            doc_ids in proptest::collection::vec("[a-z]{1,6}", 1..8),
            victim in 0usize..8,
        ) {
            let store = IndexStore::in_memory();
            for (i, id) in doc_ids.iter().enumerate() {
                store
                    .apply_document(
                        meta(id, i as u64),
                        postings(&[("shared", vec![0]), (id.as_str(), vec![4])]),
                    )
                    .unwrap();
            }

            let victim_id = &doc_ids[victim % doc_ids.len()];
            store.remove_document(victim_id).unwrap();

            prop_assert!(store.metadata(victim_id).is_none());
            for (_, document_id, _) in store.postings_containing("") {
                prop_assert!(store.metadata(&document_id).is_some());
            }
        }
    }
}
