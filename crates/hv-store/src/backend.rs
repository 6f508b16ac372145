//! Storage backend seam and the values passed through it.

use polars::prelude::AnyValue;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};

use hv_common::{DATE_FORMAT, days_to_date};

use crate::error::BackendResult;

/// A single cell bound to an insert statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Converts a DataFrame cell; `None` for types the store cannot hold.
    ///
    /// Dates are written as `YYYY-MM-DD` text.
    pub fn from_any(value: AnyValue<'_>) -> Option<Self> {
        let converted = match value {
            AnyValue::Null => SqlValue::Null,
            AnyValue::Boolean(b) => SqlValue::Integer(i64::from(b)),
            AnyValue::Int8(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::Int16(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::Int32(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::Int64(v) => SqlValue::Integer(v),
            AnyValue::UInt8(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::UInt16(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::UInt32(v) => SqlValue::Integer(i64::from(v)),
            AnyValue::UInt64(v) => SqlValue::Integer(i64::try_from(v).ok()?),
            AnyValue::Float32(v) => SqlValue::Real(f64::from(v)),
            AnyValue::Float64(v) => SqlValue::Real(v),
            AnyValue::String(s) => SqlValue::Text(s.to_string()),
            AnyValue::StringOwned(s) => SqlValue::Text(s.to_string()),
            AnyValue::Date(days) => {
                SqlValue::Text(days_to_date(days)?.format(DATE_FORMAT).to_string())
            }
            _ => return None,
        };
        Some(converted)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Operations the transactional loader needs from a relational store.
///
/// Implementations hold one exclusively owned connection. Transaction
/// boundaries are driven entirely by the loader.
pub trait StoreBackend {
    /// Human-readable connection target for logs.
    fn describe(&self) -> String;

    /// Trivial round-trip query.
    fn ping(&mut self) -> BackendResult<()>;

    /// Runs one statement without parameters.
    fn execute(&mut self, sql: &str) -> BackendResult<()>;

    fn begin(&mut self) -> BackendResult<()>;

    /// Inserts `rows` into `table`; each row is aligned with `columns`.
    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> BackendResult<usize>;

    fn commit(&mut self) -> BackendResult<()>;

    fn rollback(&mut self) -> BackendResult<()>;

    /// Runs a query returning a single integer.
    fn query_i64(&mut self, sql: &str) -> BackendResult<i64>;

    /// Runs a query returning a single nullable float.
    fn query_f64(&mut self, sql: &str) -> BackendResult<Option<f64>>;
}

/// Builds a positional-parameter insert statement.
pub fn insert_statement(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cells() {
        assert_eq!(SqlValue::from_any(AnyValue::Null), Some(SqlValue::Null));
        assert_eq!(
            SqlValue::from_any(AnyValue::Int32(3)),
            Some(SqlValue::Integer(3))
        );
        assert_eq!(
            SqlValue::from_any(AnyValue::Float64(1.25)),
            Some(SqlValue::Real(1.25))
        );
        assert_eq!(
            SqlValue::from_any(AnyValue::String("CA")),
            Some(SqlValue::Text("CA".to_string()))
        );
        assert_eq!(SqlValue::from_any(AnyValue::UInt64(u64::MAX)), None);
    }

    #[test]
    fn dates_become_iso_text() {
        // 2000-01-31 is day 10987 after the epoch.
        assert_eq!(
            SqlValue::from_any(AnyValue::Date(10987)),
            Some(SqlValue::Text("2000-01-31".to_string()))
        );
    }

    #[test]
    fn insert_statement_numbers_placeholders() {
        assert_eq!(
            insert_statement("home_values", &["region_id", "date", "bedrooms", "value"]),
            "INSERT INTO home_values (region_id, date, bedrooms, value) VALUES (?1, ?2, ?3, ?4)"
        );
    }
}
