use std::path::PathBuf;

use crate::dictionary::DictionaryType;

/// Reasons a dictionary import can fail. None of them touch the catalog.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Missing or malformed manifest: {0}")]
    MissingOrMalformedManifest(String),

    #[error("Unsupported dictionary format version: {0}")]
    UnsupportedSchemaVersion(i64),

    #[error("Failed to parse {bank}: {reason}")]
    BankParseFailure { bank: String, reason: String },

    #[error("Archive has no {expected} data")]
    TypeMismatch { expected: DictionaryType },

    #[error("Failed to write dictionary data: {0}")]
    StorageWriteFailure(#[from] std::io::Error),

    #[error("Dictionary \"{0}\" is already imported")]
    DuplicateDictionary(String),

    #[error("Another import is already in progress")]
    ImportInProgress,

    #[error("Import was cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No {kind} dictionary at position {index} (have {len})")]
    OutOfRange {
        kind: DictionaryType,
        index: usize,
        len: usize,
    },

    #[error("Failed to persist dictionary catalog: {0}")]
    Persist(#[from] std::io::Error),
}

/// Errors while restoring an already imported dictionary from disk
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
