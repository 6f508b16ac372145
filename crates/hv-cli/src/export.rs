//! Sample exports of the final tables.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use hv_model::TableKind;

/// Writes the first `rows` rows of `df` to `<dir>/<table>.csv`.
pub fn write_sample(df: &DataFrame, kind: TableKind, dir: &Path, rows: usize) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create sample directory {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", kind.name()));
    let mut file =
        File::create(&path).with_context(|| format!("create sample file {}", path.display()))?;
    let mut sample = df.head(Some(rows));
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut sample)
        .with_context(|| format!("write sample file {}", path.display()))?;
    info!(rows = sample.height(), "Exported {kind} sample to {}", path.display());
    Ok(path)
}
