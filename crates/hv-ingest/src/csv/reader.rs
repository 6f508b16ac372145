//! CSV file reading into raw tables.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::*;

use hv_model::RawTable;

use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, parse_csv_line};

/// Reads the first line of a file, without a UTF-8 BOM.
fn read_first_line(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let reader = BufReader::new(file);

    match reader.lines().next() {
        Some(line_result) => {
            let line = line_result.map_err(|e| IngestError::from_io(path, e))?;
            Ok(Some(
                line.strip_prefix('\u{feff}').unwrap_or(&line).to_string(),
            ))
        }
        None => Ok(None),
    }
}

/// Reads and validates the header row of a CSV file.
pub fn read_csv_schema(path: &Path) -> Result<CsvHeaders> {
    let Some(line) = read_first_line(path)? else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };
    if line.trim().is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    CsvHeaders::validated(parse_csv_line(&line), path)
}

/// Reads a CSV file into a [`RawTable`] with every column typed as String.
///
/// Typing is deferred to the reshape stage so that a malformed cell is
/// reported with its table index and column rather than as a vague inference
/// failure. Empty cells become nulls.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let headers = read_csv_schema(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() != headers.len() {
        return Err(IngestError::CsvParse {
            path: path.to_path_buf(),
            message: format!(
                "header declares {} columns but {} were parsed",
                headers.len(),
                df.width()
            ),
        });
    }

    Ok(RawTable::new(path, df))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_schema_single_header() {
        let file = create_temp_csv("RegionID,RegionName,2000-01-31\n1,Cook County,100\n");
        let headers = read_csv_schema(file.path()).unwrap();

        assert_eq!(headers.columns, vec!["RegionID", "RegionName", "2000-01-31"]);
    }

    #[test]
    fn test_read_csv_schema_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_schema(file.path());

        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_read_csv_schema_with_bom() {
        let file = create_temp_csv("\u{feff}RegionID,State\n1,IL\n");
        let headers = read_csv_schema(file.path()).unwrap();

        assert_eq!(headers.columns, vec!["RegionID", "State"]);
    }

    #[test]
    fn test_read_raw_table_reads_all_columns_as_text() {
        let file = create_temp_csv("RegionID,State,2000-01-31\n3101,IL,150000.5\n3102,CA,\n");
        let table = read_raw_table(file.path()).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.data.width(), 3);
        for column in table.data.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let values = table.data.column("2000-01-31").unwrap().str().unwrap();
        assert_eq!(values.get(0), Some("150000.5"));
        assert_eq!(values.get(1), None);
    }

    #[test]
    fn test_read_raw_table_header_only() {
        let file = create_temp_csv("RegionID,State,2000-01-31\n");
        let table = read_raw_table(file.path()).unwrap();

        assert_eq!(table.height(), 0);
        assert_eq!(table.data.width(), 3);
    }

    #[test]
    fn test_read_raw_table_missing_file() {
        let result = read_raw_table(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_read_raw_table_rejects_ragged_rows() {
        let file = create_temp_csv("RegionID,State\n1,IL,extra,fields\n");
        let result = read_raw_table(file.path());

        assert!(matches!(result, Err(IngestError::CsvParse { .. })));
    }
}
