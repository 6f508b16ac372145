//! SQLite implementation of [`StoreBackend`].

use rusqlite::{Connection, params_from_iter};

use crate::backend::{SqlValue, StoreBackend, insert_statement};
use crate::credentials::DbCredentials;
use crate::error::{BackendError, BackendResult};

/// In-memory database name accepted in `db_name`.
pub const IN_MEMORY: &str = ":memory:";

/// A SQLite database file (or in-memory database) with foreign keys enforced.
pub struct SqliteBackend {
    conn: Connection,
    target: String,
}

impl SqliteBackend {
    /// Opens the database named by `credentials.database`.
    pub fn open(credentials: &DbCredentials) -> BackendResult<Self> {
        let conn = if credentials.database == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(&credentials.database)?
        };
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            target: credentials.target(),
        })
    }
}

impl StoreBackend for SqliteBackend {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.target)
    }

    fn ping(&mut self) -> BackendResult<()> {
        let one: i64 = self.conn.query_row("SELECT 1", [], |row| row.get(0))?;
        if one == 1 {
            Ok(())
        } else {
            Err(BackendError::Message(format!(
                "liveness query returned {one}"
            )))
        }
    }

    fn execute(&mut self, sql: &str) -> BackendResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn begin(&mut self) -> BackendResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<SqlValue>],
    ) -> BackendResult<usize> {
        let mut stmt = self.conn.prepare(&insert_statement(table, columns))?;
        let mut inserted = 0;
        for row in rows {
            inserted += stmt.execute(params_from_iter(row.iter()))?;
        }
        Ok(inserted)
    }

    fn commit(&mut self) -> BackendResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> BackendResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn query_i64(&mut self, sql: &str) -> BackendResult<i64> {
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }

    fn query_f64(&mut self, sql: &str) -> BackendResult<Option<f64>> {
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }
}
