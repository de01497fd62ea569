//! Document and index record types
//!
//! The engine never reads document storage directly: a [`Document`] value
//! object is pushed into the indexer by the owning service. What the index
//! persists per document is the [`IndexedDocument`] metadata record plus one
//! [`Posting`] per distinct term.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DocumentType
// ============================================================================

/// Kind of document in a writing project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Manuscript chapter
    Chapter,
    /// Free-form note
    Note,
    /// Story outline
    Outline,
    /// Character profile sheet
    CharacterProfile,
    /// Setting / world-building sheet
    Setting,
    /// Anything else
    Other,
}

impl DocumentType {
    /// Stable string form, used as a histogram key in index statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Chapter => "chapter",
            DocumentType::Note => "note",
            DocumentType::Outline => "outline",
            DocumentType::CharacterProfile => "character_profile",
            DocumentType::Setting => "setting",
            DocumentType::Other => "other",
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Other
    }
}

// ============================================================================
// Document
// ============================================================================

/// Input value object consumed by the indexer
///
/// Owned by the document storage collaborator; the engine only ever sees
/// these pushed into `index()`/`remove()` on save/delete, or in bulk for
/// `rebuild()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document id
    pub id: String,
    /// Document title
    pub title: String,
    /// Raw document content
    pub content: String,
    /// Document kind
    pub document_type: DocumentType,
    /// Owning project, if any
    pub project_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with current timestamps
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Document {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            document_type: DocumentType::default(),
            project_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set document type
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    /// Builder: set owning project
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Builder: set explicit timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }
}

// ============================================================================
// IndexedDocument
// ============================================================================

/// Per-document metadata record stored in the index
///
/// Exactly one record per live document id; absence means "not indexed".
/// `content_hash` is the digest of `title + "\n" + content` and short-circuits
/// reindexing of unchanged documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document id (unique key)
    pub document_id: String,
    /// Title at index time
    pub title: String,
    /// xxh3 digest of the indexed text
    pub content_hash: u64,
    /// Total token count of the indexed text
    pub term_count: u32,
    /// Document kind
    pub document_type: DocumentType,
    /// Owning project, if any
    pub project_id: Option<String>,
    /// Document creation timestamp
    pub created_at: DateTime<Utc>,
    /// Document modification timestamp
    pub updated_at: DateTime<Utc>,
    /// When this record was written
    pub indexed_at: DateTime<Utc>,
}

// ============================================================================
// Posting
// ============================================================================

/// Inverted-index entry for one (term, document) pair
///
/// Positions are character offsets into the document's concatenated
/// `title + "\n" + content`, strictly increasing.
/// Invariant: `frequency == positions.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Occurrence count of the term in the document
    pub frequency: u32,
    /// Ordered character offsets of each occurrence
    pub positions: Vec<u32>,
}

impl Posting {
    /// Build a posting from an ordered position list
    pub fn from_positions(positions: Vec<u32>) -> Self {
        Posting {
            frequency: positions.len() as u32,
            positions,
        }
    }

    /// Check the frequency/positions invariant
    pub fn is_consistent(&self) -> bool {
        self.frequency as usize == self.positions.len()
            && self.positions.windows(2).all(|w| w[0] < w[1])
    }
}
