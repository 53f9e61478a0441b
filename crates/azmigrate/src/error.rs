use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentError;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Dependency table error: {0}")]
    Table(#[from] TableError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to parse plan JSON: {0}")]
    Plan(#[source] serde_json::Error),
}

impl MigrateError {
    /// Returns true when the error means the plan and the files on disk no
    /// longer describe the same structure. Nothing further may be migrated.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MigrateError::Merge(MergeError::StructuralDivergence { .. }))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Resource id '{0}' is empty")]
    Empty(String),

    #[error("Resource id '{id}' has an odd number of segments ({segments})")]
    OddSegments { id: String, segments: usize },

    #[error("Resource id '{id}' has an empty segment at position {position}")]
    EmptySegment { id: String, position: usize },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read dependency table '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dependency table JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse dependency table YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Invalid dependency record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error(
        "Structural divergence in '{block_type}' blocks: {blocks} on disk, \
         {before} in the before state, {after} in the after state"
    )]
    StructuralDivergence {
        block_type: String,
        blocks: usize,
        before: usize,
        after: usize,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, MigrateError>;
