//! Boundary traits
//!
//! The index never stores document bodies. Snippet and highlight generation
//! pulls content back through [`ContentProvider`], the seam to the document
//! storage collaborator.

use crate::error::Result;

/// Title and body of a document, as loaded from document storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    /// Document title
    pub title: String,
    /// Raw document content
    pub content: String,
}

/// Read-only access to document content by id
///
/// Implemented by the owning application over its document storage layer.
/// Returning `Ok(None)` means the document no longer exists; the orchestrator
/// degrades to an empty preview rather than failing the query.
pub trait ContentProvider: Send + Sync {
    /// Load the content of a document, if it still exists
    fn content(&self, document_id: &str) -> Result<Option<DocumentContent>>;
}
