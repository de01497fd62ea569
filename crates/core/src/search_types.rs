//! Query-side types: hits, options, filters, history, statistics
//!
//! These are the types exchanged across the engine's outer boundary with the
//! UI/presentation collaborator.

use crate::types::DocumentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// MatchSpan / SearchHit
// ============================================================================

/// One highlighted match within a document, line-oriented
///
/// `match_start`/`match_end` are character offsets within `line_content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    /// 1-based line number within the document content
    pub line_number: u32,
    /// Full content of the matching line
    pub line_content: String,
    /// Character offset where the match starts
    pub match_start: usize,
    /// Character offset one past the end of the match
    pub match_end: usize,
    /// Lines preceding the match, joined with newlines
    pub context_before: String,
    /// Lines following the match, joined with newlines
    pub context_after: String,
    /// Line with the matched substring wrapped in `**` markers
    pub highlighted: String,
}

/// Document metadata attached to a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitMetadata {
    /// Document kind
    pub document_type: DocumentType,
    /// Owning project, if any
    pub project_id: Option<String>,
    /// Token count of the indexed text
    pub word_count: u32,
    /// Document creation timestamp
    pub created_at: DateTime<Utc>,
    /// Document modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document id
    pub document_id: String,
    /// Document title
    pub title: String,
    /// Bounded window of content around the first match
    pub content_preview: String,
    /// Relevance score; higher is more relevant, used only for ordering
    pub relevance_score: f64,
    /// Line-oriented match spans with highlighting
    pub matches: Vec<MatchSpan>,
    /// Document metadata
    pub metadata: HitMetadata,
}

// ============================================================================
// SearchOptions / SearchFilter
// ============================================================================

/// Per-query options controlling matching and highlighting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Match case-sensitively in snippets and highlights
    pub case_sensitive: bool,
    /// Match whole words only in snippets and highlights
    pub whole_words: bool,
    /// Treat the query as a regular expression for snippet matching
    pub use_regex: bool,
    /// Attach surrounding context lines to each match span
    pub include_context: bool,
    /// Expand the query into edit-distance-1 variants
    pub fuzzy: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            case_sensitive: false,
            whole_words: false,
            use_regex: false,
            include_context: true,
            fuzzy: false,
        }
    }
}

/// Post-ranking result filter
///
/// Filters are applied strictly after ranking and never alter scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Keep only these document types
    pub document_types: Option<Vec<DocumentType>>,
    /// Keep only these projects
    pub project_ids: Option<Vec<String>>,
    /// Keep documents created within this range (inclusive)
    pub created_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Keep documents modified within this range (inclusive)
    pub updated_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Minimum indexed word count
    pub min_word_count: Option<u32>,
    /// Maximum indexed word count
    pub max_word_count: Option<u32>,
}

impl SearchFilter {
    /// Whether a hit's metadata passes every configured criterion
    pub fn matches(&self, meta: &HitMetadata) -> bool {
        if let Some(types) = &self.document_types {
            if !types.contains(&meta.document_type) {
                return false;
            }
        }
        if let Some(projects) = &self.project_ids {
            match &meta.project_id {
                Some(pid) if projects.contains(pid) => {}
                _ => return false,
            }
        }
        if let Some((from, to)) = &self.created_range {
            if meta.created_at < *from || meta.created_at > *to {
                return false;
            }
        }
        if let Some((from, to)) = &self.updated_range {
            if meta.updated_at < *from || meta.updated_at > *to {
                return false;
            }
        }
        if let Some(min) = self.min_word_count {
            if meta.word_count < min {
                return false;
            }
        }
        if let Some(max) = self.max_word_count {
            if meta.word_count > max {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// History / Statistics
// ============================================================================

/// One recorded query in the search history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Entry id
    pub id: Uuid,
    /// Exact query text as submitted
    pub query: String,
    /// Options in effect for this query
    pub options: SearchOptions,
    /// When the query ran
    pub timestamp: DateTime<Utc>,
    /// Result count of the most recent execution
    pub result_count: usize,
    /// Wall-clock execution time in milliseconds
    pub execution_time_ms: f64,
}

impl SearchHistoryEntry {
    /// Create a new entry stamped with the current time
    pub fn new(
        query: impl Into<String>,
        options: SearchOptions,
        result_count: usize,
        execution_time_ms: f64,
    ) -> Self {
        SearchHistoryEntry {
            id: Uuid::new_v4(),
            query: query.into(),
            options,
            timestamp: Utc::now(),
            result_count,
            execution_time_ms,
        }
    }
}

/// Running aggregate over all queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Total number of queries executed
    pub total_searches: u64,
    /// Total number of results returned across all queries
    pub total_results: u64,
    /// Incremental mean of results per query
    pub average_results_per_search: f64,
    /// Incremental mean of execution time in milliseconds
    pub average_execution_time_ms: f64,
    /// Occurrence count per query term
    pub term_counts: HashMap<String, u64>,
    /// Query count by hour of day (0-23)
    pub searches_by_hour: HashMap<u32, u64>,
    /// Query count by calendar day (`YYYY-MM-DD`)
    pub searches_by_day: HashMap<String, u64>,
}

impl SearchStatistics {
    /// The `n` most frequent query terms, count descending, term ascending
    /// for deterministic tie-breaks
    pub fn top_terms(&self, n: usize) -> Vec<(String, u64)> {
        let mut terms: Vec<(String, u64)> = self
            .term_counts
            .iter()
            .map(|(t, c)| (t.clone(), *c))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(n);
        terms
    }
}

// ============================================================================
// Status / Response
// ============================================================================

/// Observable state of the index store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStatus {
    /// Number of indexed documents
    pub document_count: usize,
    /// Number of distinct terms
    pub term_count: usize,
    /// Size of the persisted store in bytes (0 for in-memory stores)
    pub size_bytes: u64,
    /// Most recent `indexed_at` across all documents
    pub last_indexed_at: Option<DateTime<Utc>>,
}

/// Aggregate statistics from a full metadata scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStatistics {
    /// Number of indexed documents
    pub document_count: usize,
    /// Number of distinct terms
    pub distinct_terms: usize,
    /// Mean token count per document
    pub average_terms_per_document: f64,
    /// Document count per document type
    pub documents_by_type: HashMap<String, u64>,
}

/// Result set handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Ranked, filtered hits
    pub hits: Vec<SearchHit>,
    /// Number of hits in this response
    pub total_count: usize,
    /// Wall-clock query time in milliseconds
    pub search_time_ms: f64,
    /// Snapshot of the running statistics after this query
    pub statistics: SearchStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta(document_type: DocumentType, word_count: u32) -> HitMetadata {
        HitMetadata {
            document_type,
            project_id: Some("proj-1".to_string()),
            word_count,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.matches(&meta(DocumentType::Chapter, 100)));
    }

    #[test]
    fn test_filter_by_document_type() {
        let filter = SearchFilter {
            document_types: Some(vec![DocumentType::Note]),
            ..Default::default()
        };
        assert!(filter.matches(&meta(DocumentType::Note, 100)));
        assert!(!filter.matches(&meta(DocumentType::Chapter, 100)));
    }

    #[test]
    fn test_filter_by_project() {
        let filter = SearchFilter {
            project_ids: Some(vec!["proj-2".to_string()]),
            ..Default::default()
        };
        assert!(!filter.matches(&meta(DocumentType::Note, 100)));
    }

    #[test]
    fn test_filter_by_word_count_bounds() {
        let filter = SearchFilter {
            min_word_count: Some(50),
            max_word_count: Some(150),
            ..Default::default()
        };
        assert!(filter.matches(&meta(DocumentType::Note, 100)));
        assert!(!filter.matches(&meta(DocumentType::Note, 10)));
        assert!(!filter.matches(&meta(DocumentType::Note, 500)));
    }

    #[test]
    fn test_filter_by_date_range() {
        let filter = SearchFilter {
            created_range: Some((
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            )),
            ..Default::default()
        };
        assert!(filter.matches(&meta(DocumentType::Note, 100)));

        let filter = SearchFilter {
            created_range: Some((
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            )),
            ..Default::default()
        };
        assert!(!filter.matches(&meta(DocumentType::Note, 100)));
    }

    #[test]
    fn test_top_terms_ordering() {
        let mut stats = SearchStatistics::default();
        stats.term_counts.insert("dragon".to_string(), 5);
        stats.term_counts.insert("castle".to_string(), 2);
        stats.term_counts.insert("cave".to_string(), 2);
        stats.term_counts.insert("sword".to_string(), 9);

        let top = stats.top_terms(3);
        assert_eq!(
            top,
            vec![
                ("sword".to_string(), 9),
                ("dragon".to_string(), 5),
                ("castle".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_history_entry_new() {
        let entry = SearchHistoryEntry::new("dragon", SearchOptions::default(), 3, 1.5);
        assert_eq!(entry.query, "dragon");
        assert_eq!(entry.result_count, 3);
        assert!(entry.timestamp <= Utc::now());
    }

    #[test]
    fn test_search_options_default() {
        let options = SearchOptions::default();
        assert!(!options.case_sensitive);
        assert!(!options.use_regex);
        assert!(options.include_context);
        assert!(!options.fuzzy);
    }
}
