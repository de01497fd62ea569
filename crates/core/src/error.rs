//! Error types for the inkstone search engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for inkstone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the search engine
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Index store read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Index store corruption detected on load
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Query exceeded its wall-clock deadline
    #[error("Query timed out after {0:?}")]
    QueryTimeout(Duration),

    /// Malformed query input (e.g. an unparseable pattern)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
