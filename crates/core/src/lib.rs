//! Core types for the inkstone search engine
//!
//! This crate provides:
//! - Document and index record types ([`Document`], [`IndexedDocument`], [`Posting`])
//! - Query-side types ([`SearchHit`], [`SearchOptions`], [`SearchFilter`], history and statistics)
//! - The error taxonomy ([`Error`], [`Result`])
//! - Engine configuration ([`SearchConfig`])
//! - The [`ContentProvider`] boundary trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod search_types;
pub mod traits;
pub mod types;

pub use config::SearchConfig;
pub use error::{Error, Result};
pub use search_types::{
    HitMetadata, IndexStatistics, IndexStatus, MatchSpan, SearchFilter, SearchHistoryEntry,
    SearchHit, SearchOptions, SearchResponse, SearchStatistics,
};
pub use traits::{ContentProvider, DocumentContent};
pub use types::{Document, DocumentType, IndexedDocument, Posting};
