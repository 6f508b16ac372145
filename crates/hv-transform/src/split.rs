//! Split of the merged table into the regions and home values projections.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{error, info, info_span};

use hv_common::any_to_string;
use hv_model::{
    HOME_VALUE_COLUMNS, HomeValuesTable, MergedTable, REGION_COLUMNS, RegionsTable, TableKind,
    missing_columns,
};

use crate::error::{Result, TransformError};

/// Splits the merged table into its two output projections.
///
/// Both column contracts are checked before anything is projected, so a
/// failure never yields one table without the other.
pub fn split(table: MergedTable) -> Result<(RegionsTable, HomeValuesTable)> {
    let span = info_span!("split", rows = table.height());
    let _guard = span.enter();

    let result = split_frame(&table.data);
    match &result {
        Ok((regions, home_values)) => info!(
            regions = regions.height(),
            home_values = home_values.height(),
            "Split merged dataframe into regions and home_values"
        ),
        Err(err) => error!("An error occurred while splitting the merged dataframe: {err}"),
    }
    result
}

fn split_frame(data: &DataFrame) -> Result<(RegionsTable, HomeValuesTable)> {
    let present: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for kind in TableKind::ALL {
        let missing = missing_columns(&present, kind.columns());
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns {
                table: kind,
                columns: missing,
            });
        }
    }

    let regions = dedupe_rows(data.select(REGION_COLUMNS)?)?;
    if regions.height() == 0 {
        return Err(TransformError::EmptyProjection {
            table: TableKind::Regions,
        });
    }

    let home_values = data.select(HOME_VALUE_COLUMNS)?;
    if home_values.height() == 0 {
        return Err(TransformError::EmptyProjection {
            table: TableKind::HomeValues,
        });
    }

    Ok((
        RegionsTable { data: regions },
        HomeValuesTable { data: home_values },
    ))
}

/// Keeps the first occurrence of every distinct row, preserving order.
fn dedupe_rows(df: DataFrame) -> Result<DataFrame> {
    let row_count = df.height();
    let mut seen = HashSet::with_capacity(row_count);
    let mut keep = Vec::with_capacity(row_count);
    for idx in 0..row_count {
        let mut key: Vec<Option<String>> = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let value = column.get(idx)?;
            key.push(if value.is_null() {
                None
            } else {
                Some(any_to_string(value))
            });
        }
        keep.push(seen.insert(key));
    }
    if keep.iter().all(|kept| *kept) {
        return Ok(df);
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    Ok(df.filter(&mask)?)
}
