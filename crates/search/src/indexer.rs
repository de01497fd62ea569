//! Write path into the index store
//!
//! The indexer tokenizes `title + "\n" + content`, groups occurrences per
//! term and replaces the document's rows in the store as one atomic unit.
//! A content-hash short-circuit skips documents whose indexed text has not
//! changed, so unrelated re-saves never pay for tokenization.

use crate::tokenizer::tokenize;
use chrono::Utc;
use inkstone_core::error::Result;
use inkstone_core::types::{Document, IndexedDocument, Posting};
use inkstone_store::IndexStore;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Outcome of indexing one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Postings and metadata were (re)written
    Indexed,
    /// Content hash unchanged; nothing written
    Skipped,
}

/// Outcome of a full rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Documents successfully indexed
    pub indexed: usize,
    /// Documents that failed; failures are logged, not escalated
    pub failed: usize,
}

/// The write path into the index store
pub struct Indexer {
    store: Arc<IndexStore>,
}

/// The exact text the index is built over; posting positions are character
/// offsets into this concatenation
pub fn indexed_text(document: &Document) -> String {
    format!("{}\n{}", document.title, document.content)
}

fn content_hash(document: &Document) -> u64 {
    xxh3_64(indexed_text(document).as_bytes())
}

impl Indexer {
    /// Create an indexer over a store handle
    pub fn new(store: Arc<IndexStore>) -> Self {
        Indexer { store }
    }

    /// Index one document, skipping if its content hash is unchanged
    pub fn index(&self, document: &Document) -> Result<IndexOutcome> {
        let hash = content_hash(document);

        if let Some(existing) = self.store.metadata(&document.id) {
            if existing.content_hash == hash {
                debug!(document_id = %document.id, "Content unchanged, skipping reindex");
                return Ok(IndexOutcome::Skipped);
            }
        }

        let text = indexed_text(document);
        let tokens = tokenize(&text);
        let term_count = tokens.len() as u32;

        // Group occurrences per term; positions arrive in scan order and so
        // stay strictly increasing
        let mut grouped: FxHashMap<String, Vec<u32>> = FxHashMap::default();
        for token in tokens {
            grouped.entry(token.term).or_default().push(token.offset);
        }
        let postings: Vec<(String, Posting)> = grouped
            .into_iter()
            .map(|(term, positions)| (term, Posting::from_positions(positions)))
            .collect();

        let meta = IndexedDocument {
            document_id: document.id.clone(),
            title: document.title.clone(),
            content_hash: hash,
            term_count,
            document_type: document.document_type,
            project_id: document.project_id.clone(),
            created_at: document.created_at,
            updated_at: document.updated_at,
            indexed_at: Utc::now(),
        };

        let distinct_terms = postings.len();
        self.store.apply_document(meta, postings)?;

        info!(
            document_id = %document.id,
            terms = term_count,
            distinct_terms,
            "Document indexed"
        );
        Ok(IndexOutcome::Indexed)
    }

    /// Remove a document from the index; idempotent
    pub fn remove(&self, document_id: &str) -> Result<bool> {
        let existed = self.store.remove_document(document_id)?;
        debug!(document_id, existed, "Document removed from index");
        Ok(existed)
    }

    /// Clear the store and index every document from scratch
    ///
    /// Recovery path for suspected inconsistency; continues past per-document
    /// failures and reports how many succeeded. O(corpus size) by design.
    pub fn rebuild(&self, documents: &[Document]) -> Result<RebuildReport> {
        self.store.clear()?;

        let mut report = RebuildReport::default();
        for document in documents {
            match self.index(document) {
                Ok(_) => report.indexed += 1,
                Err(e) => {
                    warn!(document_id = %document.id, error = %e, "Failed to index during rebuild");
                    report.failed += 1;
                }
            }
        }

        info!(
            indexed = report.indexed,
            failed = report.failed,
            "Index rebuild complete"
        );
        Ok(report)
    }
}
