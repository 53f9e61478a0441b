//! Document-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, editing or writing configuration files.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read config directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse HCL in '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid expression '{expression}': {message}")]
    Expression { expression: String, message: String },

    #[error("No block found in candidate configuration")]
    NoBlock,
}

impl DocumentError {
    /// Returns true if the error is confined to one unreadable document and a
    /// scan over the other documents can go on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, DocumentError::Parse { .. })
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
