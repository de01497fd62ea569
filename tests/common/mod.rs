//! Shared fixtures for integration tests

// Not every test binary uses every helper
#![allow(dead_code)]

use inkstone::{ContentProvider, Document, DocumentContent, Result, SearchService};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Content provider over an in-memory map, standing in for document storage
#[derive(Default)]
pub struct MapProvider {
    docs: RwLock<HashMap<String, DocumentContent>>,
}

impl MapProvider {
    pub fn insert(&self, document: &Document) {
        self.docs.write().insert(
            document.id.clone(),
            DocumentContent {
                title: document.title.clone(),
                content: document.content.clone(),
            },
        );
    }

    pub fn remove(&self, document_id: &str) {
        self.docs.write().remove(document_id);
    }
}

impl ContentProvider for MapProvider {
    fn content(&self, document_id: &str) -> Result<Option<DocumentContent>> {
        Ok(self.docs.read().get(document_id).cloned())
    }
}

/// Register a document with the provider and index it
pub fn index(service: &SearchService, provider: &MapProvider, document: &Document) {
    provider.insert(document);
    service.index_document(document).unwrap();
}
