//! Inkstone: an embeddable full-text search and indexing engine
//!
//! A persistent inverted index with a tokenizer, a ranking query engine and
//! a service layer that adds result caching, snippet highlighting, search
//! history, statistics, fuzzy matching and post-ranking filters.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use inkstone::{
//!     ContentProvider, Document, DocumentContent, IndexStore, Result,
//!     SearchConfig, SearchFilter, SearchOptions, SearchService,
//! };
//!
//! struct OneDoc(Document);
//!
//! impl ContentProvider for OneDoc {
//!     fn content(&self, document_id: &str) -> Result<Option<DocumentContent>> {
//!         Ok((document_id == self.0.id).then(|| DocumentContent {
//!             title: self.0.title.clone(),
//!             content: self.0.content.clone(),
//!         }))
//!     }
//! }
//!
//! let doc = Document::new("ch-1", "Dragon Slayer", "The dragon roared.");
//! let store = Arc::new(IndexStore::in_memory());
//! let service = SearchService::new(
//!     store,
//!     Arc::new(OneDoc(doc.clone())),
//!     SearchConfig::default(),
//! );
//!
//! service.index_document(&doc).unwrap();
//! let response = service
//!     .search("dragon", &SearchOptions::default(), &SearchFilter::default(), None)
//!     .unwrap();
//! assert_eq!(response.total_count, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use inkstone_core::config::SearchConfig;
pub use inkstone_core::error::{Error, Result};
pub use inkstone_core::search_types::{
    HitMetadata, IndexStatistics, IndexStatus, MatchSpan, SearchFilter, SearchHistoryEntry,
    SearchHit, SearchOptions, SearchResponse, SearchStatistics,
};
pub use inkstone_core::traits::{ContentProvider, DocumentContent};
pub use inkstone_core::types::{Document, DocumentType, IndexedDocument, Posting};
pub use inkstone_search::{
    IndexOutcome, Indexer, QueryEngine, RebuildReport, SearchService, StatisticsTracker,
};
pub use inkstone_store::IndexStore;
