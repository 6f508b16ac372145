//! Transactional loading of the output tables.

use polars::prelude::*;
use tracing::{error, info, info_span, warn};

use hv_model::columns::VALUE;
use hv_model::{TableKind, missing_columns};

use crate::backend::{SqlValue, StoreBackend};
use crate::credentials::DbCredentials;
use crate::error::{LoaderState, Result, StoreError};
use crate::schema::SCHEMA_STATEMENTS;
use crate::sqlite::SqliteBackend;

/// Drives one load transaction against a [`StoreBackend`].
///
/// Operations must be called in lifecycle order:
/// `connect → verify → ensure_schema → load* → commit | rollback`.
/// Anything else fails with [`StoreError::InvalidState`]. The transaction
/// starts in [`ensure_schema`](Self::ensure_schema); a loader dropped with the
/// transaction still open rolls it back.
pub struct TransactionalLoader<B: StoreBackend> {
    backend: B,
    state: LoaderState,
    in_transaction: bool,
}

impl TransactionalLoader<SqliteBackend> {
    /// Opens a SQLite connection from `credentials`.
    pub fn connect(credentials: &DbCredentials) -> Result<Self> {
        let target = credentials.target();
        match SqliteBackend::open(credentials) {
            Ok(backend) => {
                info!(target_db = %target, "Connected to target store");
                Ok(Self::with_backend(backend))
            }
            Err(cause) => {
                error!(target_db = %target, "Failed to connect to target store: {cause}");
                Err(StoreError::Connect { target, cause })
            }
        }
    }
}

impl<B: StoreBackend> TransactionalLoader<B> {
    /// Wraps an already connected backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            state: LoaderState::Connected,
            in_transaction: false,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn require(&self, operation: &'static str, allowed: &[LoaderState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            error!(operation, state = %self.state, "Loader operation called out of order");
            Err(StoreError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Confirms the connection is alive.
    pub fn verify(&mut self) -> Result<()> {
        self.require("verify", &[LoaderState::Connected])?;
        if let Err(cause) = self.backend.ping() {
            error!("Connection check failed: {cause}");
            return Err(StoreError::Verify { cause });
        }
        info!(target_db = %self.backend.describe(), "Connection check succeeded");
        self.state = LoaderState::Verified;
        Ok(())
    }

    /// Begins the transaction and creates any missing target tables.
    pub fn ensure_schema(&mut self) -> Result<()> {
        self.require("create schema", &[LoaderState::Verified])?;
        if let Err(cause) = self.backend.begin() {
            error!("Failed to begin transaction: {cause}");
            return Err(StoreError::Schema { cause });
        }
        self.in_transaction = true;
        for statement in SCHEMA_STATEMENTS {
            if let Err(cause) = self.backend.execute(statement) {
                error!("Failed to create target schema: {cause}");
                return Err(StoreError::Schema { cause });
            }
        }
        info!("Target schema ready");
        self.state = LoaderState::SchemaReady;
        Ok(())
    }

    /// Appends every row of `df` to the table called `name`.
    ///
    /// Returns the number of rows inserted.
    pub fn load(&mut self, df: &DataFrame, name: &str) -> Result<usize> {
        self.require("load", &[LoaderState::SchemaReady, LoaderState::Loading])?;
        let Some(kind) = TableKind::from_name(name) else {
            error!(table = name, "Refusing to load unknown table");
            return Err(StoreError::UnknownTable {
                name: name.to_string(),
            });
        };
        let span = info_span!("load", table = kind.name(), rows = df.height());
        let _guard = span.enter();

        let rows = match table_rows(df, kind) {
            Ok(rows) => rows,
            Err(err) => {
                error!("Failed to convert {kind} for loading: {err}");
                return Err(err);
            }
        };
        self.state = LoaderState::Loading;
        match self.backend.insert_rows(kind.name(), kind.columns(), &rows) {
            Ok(inserted) => {
                info!(inserted, "Loaded {kind} into target store");
                Ok(inserted)
            }
            Err(cause) => {
                error!("Failed to load {kind}: {cause}");
                Err(StoreError::Load {
                    table: kind.name().to_string(),
                    cause,
                })
            }
        }
    }

    /// Commits the transaction; on failure rolls it back exactly once.
    pub fn commit(&mut self) -> Result<()> {
        self.require("commit", &[LoaderState::SchemaReady, LoaderState::Loading])?;
        let commit_error = match self.backend.commit() {
            Ok(()) => {
                self.in_transaction = false;
                self.state = LoaderState::Committed;
                info!("Transaction committed");
                return Ok(());
            }
            Err(cause) => cause,
        };

        error!("Commit failed, rolling back: {commit_error}");
        let rollback = self.backend.rollback();
        self.in_transaction = false;
        match rollback {
            Ok(()) => {
                self.state = LoaderState::RolledBack;
                warn!("Transaction rolled back after failed commit");
                Err(StoreError::Commit {
                    cause: commit_error,
                })
            }
            Err(rollback_error) => {
                error!("Rollback after failed commit also failed: {rollback_error}");
                Err(StoreError::CommitAndRollback {
                    commit: commit_error,
                    rollback: rollback_error,
                })
            }
        }
    }

    /// Abandons every load since the transaction began.
    pub fn rollback(&mut self) -> Result<()> {
        self.require("roll back", &[LoaderState::SchemaReady, LoaderState::Loading])?;
        let result = self.backend.rollback();
        self.in_transaction = false;
        match result {
            Ok(()) => {
                self.state = LoaderState::RolledBack;
                info!("Transaction rolled back");
                Ok(())
            }
            Err(cause) => {
                error!("Rollback failed: {cause}");
                Err(StoreError::Rollback { cause })
            }
        }
    }

    /// Number of rows currently visible in a target table.
    pub fn row_count(&mut self, kind: TableKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.name());
        self.backend
            .query_i64(&sql)
            .map_err(|cause| StoreError::Query { cause })
    }

    /// Sum of `home_values.value` (0 for an empty table).
    pub fn value_sum(&mut self) -> Result<f64> {
        let sql = format!(
            "SELECT SUM({VALUE}) FROM {}",
            TableKind::HomeValues.name()
        );
        self.backend
            .query_f64(&sql)
            .map(|sum| sum.unwrap_or(0.0))
            .map_err(|cause| StoreError::Query { cause })
    }
}

impl<B: StoreBackend> Drop for TransactionalLoader<B> {
    fn drop(&mut self) {
        if self.in_transaction {
            warn!(state = %self.state, "Loader dropped with an open transaction, rolling back");
            if let Err(cause) = self.backend.rollback() {
                error!("Rollback on drop failed: {cause}");
            }
            self.in_transaction = false;
        }
    }
}

/// Converts the contract columns of `df` into insert rows.
fn table_rows(df: &DataFrame, kind: TableKind) -> Result<Vec<Vec<SqlValue>>> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing = missing_columns(&present, kind.columns());
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns {
            table: kind.name().to_string(),
            columns: missing,
        });
    }

    let columns: Vec<&Column> = kind
        .columns()
        .iter()
        .filter_map(|name| df.column(name).ok())
        .collect();

    let mut rows = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut values = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = column.get(row).unwrap_or(AnyValue::Null);
            let value = SqlValue::from_any(cell.clone()).ok_or_else(|| StoreError::Conversion {
                table: kind.name().to_string(),
                column: column.name().to_string(),
                row,
                value: cell.to_string(),
            })?;
            values.push(value);
        }
        rows.push(values);
    }
    Ok(rows)
}
