//! Extraction stage: a directory of wide CSV files into raw tables.

use std::path::{Path, PathBuf};

use tracing::{error, info, info_span};

use hv_model::RawTable;

use crate::csv::read_raw_table;
use crate::discovery::list_csv_files;
use crate::error::Result;

/// Reads every CSV file of `dir`, in file name order.
///
/// The first failure is logged with the file name and returned; no partial
/// collection is ever handed back.
pub fn extract(dir: &Path) -> Result<Vec<RawTable>> {
    let span = info_span!("extract", dir = %dir.display());
    let _guard = span.enter();
    info!("Beginning Extraction process...");

    let files = match list_csv_files(dir) {
        Ok(files) => files,
        Err(err) => {
            error!(dir = %dir.display(), "Could not list source files: {err}");
            return Err(err);
        }
    };

    let tables = extract_files(&files)?;
    info!(file_count = tables.len(), "Extraction process complete.");
    Ok(tables)
}

/// Reads an explicit list of files, index-aligned with `files`.
pub fn extract_files(files: &[PathBuf]) -> Result<Vec<RawTable>> {
    let mut tables = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        match read_raw_table(path) {
            Ok(table) => {
                info!(
                    rows = table.height(),
                    columns = table.data.width(),
                    "Successfully loaded {filename} into table[{index}]"
                );
                tables.push(table);
            }
            Err(err) => {
                error!(index, "An error occurred while processing file: {filename}. Error: {err}");
                return Err(err);
            }
        }
    }
    Ok(tables)
}
