//! Loading of the normalized tables into a relational store.
//!
//! [`DbCredentials`] come from a `key=value` file, [`TransactionalLoader`]
//! wraps one transaction over a [`StoreBackend`] and [`schema`] holds the
//! target DDL. The bundled backend is SQLite.

pub mod backend;
pub mod credentials;
pub mod error;
pub mod loader;
pub mod schema;
pub mod sqlite;

pub use backend::{SqlValue, StoreBackend, insert_statement};
pub use credentials::DbCredentials;
pub use error::{BackendError, BackendResult, LoaderState, Result, StoreError};
pub use loader::TransactionalLoader;
pub use schema::{HOME_VALUES_DDL, REGIONS_DDL, SCHEMA_STATEMENTS, schema_sql};
pub use sqlite::{IN_MEMORY, SqliteBackend};
