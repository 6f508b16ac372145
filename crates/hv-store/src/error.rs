//! Error types for credentials and the transactional loader.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure reported by a [`StoreBackend`](crate::StoreBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Any other backend failure.
    #[error("{0}")]
    Message(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Lifecycle of a [`TransactionalLoader`](crate::TransactionalLoader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderState {
    Connected,
    Verified,
    SchemaReady,
    Loading,
    Committed,
    RolledBack,
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderState::Connected => "connected",
            LoaderState::Verified => "verified",
            LoaderState::SchemaReady => "schema-ready",
            LoaderState::Loading => "loading",
            LoaderState::Committed => "committed",
            LoaderState::RolledBack => "rolled-back",
        };
        f.write_str(name)
    }
}

/// Errors raised while reading credentials or loading the target store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    // === Credential Errors ===
    /// Credential file does not exist.
    #[error("credential file not found: {path}")]
    CredentialsNotFound { path: PathBuf },

    /// Credential file could not be read.
    #[error("failed to read credential file {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent or blank.
    #[error("credential file {path} does not define '{key}'")]
    MissingCredential { path: PathBuf, key: &'static str },

    /// `db_port` is not a valid port number.
    #[error("credential file {path}: invalid db_port '{value}'")]
    InvalidPort { path: PathBuf, value: String },

    // === Connection Errors ===
    /// The backend could not be opened.
    #[error("failed to connect to {target}: {cause}")]
    Connect {
        target: String,
        #[source]
        cause: BackendError,
    },

    /// The liveness round trip failed.
    #[error("connection check failed: {cause}")]
    Verify {
        #[source]
        cause: BackendError,
    },

    // === Transaction Errors ===
    /// Schema creation failed.
    #[error("failed to create target schema: {cause}")]
    Schema {
        #[source]
        cause: BackendError,
    },

    /// Only `regions` and `home_values` can be loaded.
    #[error("unknown target table '{name}'")]
    UnknownTable { name: String },

    /// The frame lacks columns the target table needs.
    #[error("cannot load {table}: missing columns {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// A cell has a type the store cannot hold.
    #[error("cannot load {table}: column '{column}' row {row} has unsupported value {value}")]
    Conversion {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// Insert failed (constraint violation, type mismatch, ...).
    #[error("failed to load {table}: {cause}")]
    Load {
        table: String,
        #[source]
        cause: BackendError,
    },

    /// Commit failed; the transaction was rolled back.
    #[error("commit failed and the transaction was rolled back: {cause}")]
    Commit {
        #[source]
        cause: BackendError,
    },

    /// Commit failed and so did the compensating rollback.
    #[error("commit failed ({commit}) and rollback failed ({rollback})")]
    CommitAndRollback {
        commit: BackendError,
        rollback: BackendError,
    },

    /// Explicit rollback failed.
    #[error("rollback failed: {cause}")]
    Rollback {
        #[source]
        cause: BackendError,
    },

    /// Read-back query failed.
    #[error("query failed: {cause}")]
    Query {
        #[source]
        cause: BackendError,
    },

    /// Operation invoked out of order.
    #[error("cannot {operation} while the loader is {state}")]
    InvalidState {
        operation: &'static str,
        state: LoaderState,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
