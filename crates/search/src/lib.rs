//! Full-text search: tokenization, indexing, query execution and the
//! query orchestrator
//!
//! The crate is layered bottom-up:
//!
//! - [`tokenizer`] turns text into lowercase terms with character offsets
//! - [`indexer`] writes documents into an [`inkstone_store::IndexStore`]
//! - [`engine`] executes tokenized queries against the store and ranks hits
//! - [`service`] wraps the engine with caching, snippets, filters, history,
//!   statistics, fuzzy expansion and timeouts
//!
//! Callers normally construct a [`SearchService`] and never touch the lower
//! layers directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod engine;
pub mod fuzzy;
pub mod highlight;
pub mod history;
pub mod indexer;
pub mod service;
pub mod stats;
pub mod tokenizer;

pub use cache::ResultCache;
pub use engine::{Deadline, QueryEngine};
pub use highlight::QueryMatcher;
pub use history::SearchHistory;
pub use indexer::{IndexOutcome, Indexer, RebuildReport};
pub use service::SearchService;
pub use stats::StatisticsTracker;
pub use tokenizer::{tokenize, tokenize_unique, Token};
