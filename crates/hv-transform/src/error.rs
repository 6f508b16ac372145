//! Error types for the reshape, merge, split and clean stages.

use hv_model::TableKind;
use polars::error::PolarsError;
use thiserror::Error;

/// Errors raised by the transformation stages.
///
/// Every reshape and merge variant carries the zero-based table index and the
/// source file name so a failure can be traced back to its input file.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransformError {
    // =========================================================================
    // RESHAPE ERRORS
    // =========================================================================
    /// An identifying column is absent from a wide table.
    #[error("table[{index}] ({file}): missing identifying column '{column}'")]
    MissingIdColumn {
        index: usize,
        file: String,
        column: String,
    },

    /// A non-identifying header is not a `YYYY-MM-DD` date.
    #[error("table[{index}] ({file}): column '{column}' is not a YYYY-MM-DD date")]
    InvalidDateHeader {
        index: usize,
        file: String,
        column: String,
    },

    /// An observation cell holds text that is not a number.
    #[error("table[{index}] ({file}): non-numeric value '{value}' in column '{column}', row {row}")]
    InvalidValue {
        index: usize,
        file: String,
        column: String,
        row: usize,
        value: String,
    },

    /// An integer identifier cell could not be parsed.
    #[error("table[{index}] ({file}): invalid identifier '{value}' in column '{column}', row {row}")]
    InvalidIdentifier {
        index: usize,
        file: String,
        column: String,
        row: usize,
        value: String,
    },

    /// A required identifying cell (the region id) is empty.
    #[error("table[{index}] ({file}): row {row} has no value in required column '{column}'")]
    MissingIdentifier {
        index: usize,
        file: String,
        column: String,
        row: usize,
    },

    // =========================================================================
    // MERGE ERRORS
    // =========================================================================
    /// Merge called without any table.
    #[error("no tables to merge")]
    NoTables,

    /// A long table has no rows.
    #[error("table[{index}] ({file}) is empty")]
    EmptyTable { index: usize, file: String },

    /// The bedroom plan has no count for a source.
    #[error("table[{index}] ({file}): {plan} bedroom plan assigns no bedroom count")]
    UnassignedBedrooms {
        index: usize,
        file: String,
        plan: &'static str,
    },

    /// A table's column set differs from the first table's.
    #[error(
        "table[{index}] ({file}): columns [{}] do not match [{}]",
        found.join(", "),
        expected.join(", ")
    )]
    SchemaMismatch {
        index: usize,
        file: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Appending a table failed (usually a dtype conflict).
    #[error("table[{index}] ({file}): concatenation failed: {cause}")]
    Concat {
        index: usize,
        file: String,
        #[source]
        cause: PolarsError,
    },

    /// The merged height differs from the sum of the inputs.
    #[error("merged table has {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    // =========================================================================
    // SPLIT ERRORS
    // =========================================================================
    /// Required columns of an output table are absent.
    #[error("{table} is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        table: TableKind,
        columns: Vec<String>,
    },

    /// A projection produced no rows.
    #[error("{table} projection is empty, nothing to load")]
    EmptyProjection { table: TableKind },

    // =========================================================================
    // GENERAL
    // =========================================================================
    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
