//! Extraction of wide-format home value files.
//!
//! Reads a directory of delimited files, one per bedroom-count category, into
//! [`RawTable`](hv_model::RawTable)s. Every cell is kept as text; typing is the
//! reshape stage's job.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use hv_ingest::extract;
//!
//! let tables = extract(Path::new("data"))?;
//! for table in &tables {
//!     println!("{}: {} rows", table.source_name(), table.height());
//! }
//! ```

mod csv;
mod discovery;
mod error;
mod extract;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{CsvHeaders, parse_csv_line, read_csv_schema, read_raw_table};

// === File Discovery ===
pub use discovery::list_csv_files;

// === Extraction Stage ===
pub use extract::{extract, extract_files};
