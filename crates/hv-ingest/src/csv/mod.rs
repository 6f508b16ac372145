//! CSV reading utilities.

mod header;
mod reader;

pub use header::{CsvHeaders, parse_csv_line};
pub use reader::{read_csv_schema, read_raw_table};
