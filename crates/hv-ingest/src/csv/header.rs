//! CSV header parsing and validation.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Column names of a source file, as found in its header row.
#[derive(Debug, Clone)]
pub struct CsvHeaders {
    /// Trimmed column names in file order.
    pub columns: Vec<String>,
}

impl CsvHeaders {
    /// Validates a parsed header row: at least one column, no blank and no
    /// repeated names.
    pub fn validated(columns: Vec<String>, path: &Path) -> Result<Self> {
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(IngestError::NoHeaderDetected {
                path: path.to_path_buf(),
            });
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if column.is_empty() {
                return Err(IngestError::EmptyColumnName {
                    path: path.to_path_buf(),
                    position,
                });
            }
            if !seen.insert(column.as_str()) {
                return Err(IngestError::DuplicateColumn {
                    path: path.to_path_buf(),
                    column: column.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Normalizes a header value by trimming whitespace.
fn normalize_header(value: &str) -> String {
    value.trim().to_string()
}

/// Parses a CSV line into fields, handling quoted values.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(normalize_header(&current));
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(normalize_header(&current));
    fields
}
