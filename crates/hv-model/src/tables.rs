//! Stage table types.
//!
//! Each stage of the pipeline owns exactly one of these wrappers and hands it
//! to the next stage by value.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

/// A wide-format table read from one source file. Every cell is text.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: PathBuf,
    pub data: DataFrame,
}

impl RawTable {
    pub fn new(source: impl Into<PathBuf>, data: DataFrame) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }

    /// File name of the source, used in diagnostics and bedroom plans.
    pub fn source_name(&self) -> String {
        source_name(&self.source)
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }
}

/// One source after the wide to long reshape; `bedrooms` is still unset.
#[derive(Debug, Clone)]
pub struct LongTable {
    pub source: PathBuf,
    pub data: DataFrame,
}

impl LongTable {
    pub fn new(source: impl Into<PathBuf>, data: DataFrame) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }

    pub fn source_name(&self) -> String {
        source_name(&self.source)
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }
}

/// Union of all long tables, with `bedrooms` assigned per source.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub data: DataFrame,
    /// Source file names in append order.
    pub sources: Vec<String>,
}

impl MergedTable {
    pub fn height(&self) -> usize {
        self.data.height()
    }
}

/// Deduplicated region dimension (`region_id` is its primary key).
#[derive(Debug, Clone)]
pub struct RegionsTable {
    pub data: DataFrame,
}

/// Home value facts keyed by (`region_id`, `date`, `bedrooms`).
#[derive(Debug, Clone)]
pub struct HomeValuesTable {
    pub data: DataFrame,
}

impl RegionsTable {
    pub fn height(&self) -> usize {
        self.data.height()
    }
}

impl HomeValuesTable {
    pub fn height(&self) -> usize {
        self.data.height()
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
