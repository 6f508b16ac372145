//! Concatenation of long tables with bedroom assignment.

use polars::prelude::*;
use tracing::{error, info, info_span};

use hv_model::columns::BEDROOMS;
use hv_model::{BedroomPlan, LongTable, MergedTable};

use crate::error::{Result, TransformError};

/// Merges long tables into one, assigning `bedrooms` per source.
///
/// Tables are appended in the order given, each after an emptiness check.
/// Rows are never deduplicated. Every failure is logged before it is returned.
pub fn merge(tables: Vec<LongTable>, plan: &BedroomPlan) -> Result<MergedTable> {
    let span = info_span!("merge", tables = tables.len(), plan = plan.describe());
    let _guard = span.enter();

    let result = merge_tables(tables, plan);
    match &result {
        Ok(merged) => info!(
            rows = merged.height(),
            sources = merged.sources.len(),
            "Merged tables into one dataframe"
        ),
        Err(err) => error!("An error occurred while merging tables: {err}"),
    }
    result
}

fn merge_tables(tables: Vec<LongTable>, plan: &BedroomPlan) -> Result<MergedTable> {
    if tables.is_empty() {
        return Err(TransformError::NoTables);
    }
    let expected: usize = tables.iter().map(LongTable::height).sum();

    let mut sources = Vec::with_capacity(tables.len());
    let mut reference: Vec<String> = Vec::new();
    let mut merged: Option<DataFrame> = None;

    for (index, table) in tables.into_iter().enumerate() {
        let file = table.source_name();
        if table.is_empty() {
            return Err(TransformError::EmptyTable { index, file });
        }
        let bedrooms =
            plan.bedrooms_for(index, &file)
                .ok_or_else(|| TransformError::UnassignedBedrooms {
                    index,
                    file: file.clone(),
                    plan: plan.describe(),
                })?;

        let mut data = table.data;
        let rows = data.height();
        data.with_column(Series::new(BEDROOMS.into(), vec![bedrooms; rows]))?;

        match merged.as_mut() {
            None => {
                reference = column_names(&data);
                merged = Some(data);
            }
            Some(acc) => {
                let found = column_names(&data);
                if !same_column_set(&reference, &found) {
                    return Err(TransformError::SchemaMismatch {
                        index,
                        file,
                        expected: reference,
                        found,
                    });
                }
                let aligned = data.select(reference.iter().map(String::as_str))?;
                acc.vstack_mut(&aligned)
                    .map_err(|cause| TransformError::Concat {
                        index,
                        file: file.clone(),
                        cause,
                    })?;
            }
        }

        info!(index, bedrooms, rows, "Appended {file} to merged dataframe");
        sources.push(file);
    }

    let Some(data) = merged else {
        return Err(TransformError::NoTables);
    };

    if data.height() != expected {
        return Err(TransformError::RowCountMismatch {
            expected,
            actual: data.height(),
        });
    }

    Ok(MergedTable { data, sources })
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn same_column_set(expected: &[String], found: &[String]) -> bool {
    let mut expected: Vec<&String> = expected.iter().collect();
    let mut found: Vec<&String> = found.iter().collect();
    expected.sort();
    found.sort();
    expected == found
}
