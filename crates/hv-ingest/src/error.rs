//! Error types for source file extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting raw tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input directory holds no CSV files.
    #[error("no CSV files found in {path}")]
    NoSourceFiles { path: PathBuf },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars (malformed rows, bad quoting, ...).
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no content at all (not even a header row).
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header row present but without any column names.
    #[error("could not detect header row in {path}")]
    NoHeaderDetected { path: PathBuf },

    /// A header cell is blank.
    #[error("CSV file {path} has an empty column name at position {position}")]
    EmptyColumnName { path: PathBuf, position: usize },

    /// The same column name occurs twice in the header.
    #[error("CSV file {path} repeats column '{column}'")]
    DuplicateColumn { path: PathBuf, column: String },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    /// Maps an `io::Error` on `path` to `FileNotFound` or `FileRead`.
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}
