//! Null inspection and optional removal of missing observations.

use polars::prelude::*;
use tracing::info;

use hv_model::HomeValuesTable;
use hv_model::columns::VALUE;

use crate::error::Result;

/// Result of [`drop_null_values`], with the before/after totals.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: HomeValuesTable,
    pub rows_before: usize,
    pub rows_after: usize,
    pub value_sum_before: f64,
    pub value_sum_after: f64,
}

impl CleanOutcome {
    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Null count per column, in column order.
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.null_count()))
        .collect()
}

/// Drops home value rows whose `value` is missing.
///
/// Nulls contribute nothing to a sum, so both totals should agree; they are
/// logged for the operator to compare.
pub fn drop_null_values(table: HomeValuesTable) -> Result<CleanOutcome> {
    let rows_before = table.height();
    let values = table.data.column(VALUE)?.f64()?;
    let value_sum_before = values.sum().unwrap_or(0.0);
    let mask = values.is_not_null();

    let data = table.data.filter(&mask)?;
    let value_sum_after = data.column(VALUE)?.f64()?.sum().unwrap_or(0.0);
    let rows_after = data.height();

    info!(rows_before, value_sum_before, "Sum of values before dropping nulls");
    info!(rows_after, value_sum_after, "Sum of values after dropping nulls");

    Ok(CleanOutcome {
        table: HomeValuesTable { data },
        rows_before,
        rows_after,
        value_sum_before,
        value_sum_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home_values(values: Vec<Option<f64>>) -> HomeValuesTable {
        let rows = values.len();
        let df = DataFrame::new(vec![
            Series::new("region_id".into(), vec![1i64; rows]).into_column(),
            Series::new(VALUE.into(), values).into_column(),
        ])
        .unwrap();
        HomeValuesTable { data: df }
    }

    #[test]
    fn counts_nulls_per_column() {
        let table = home_values(vec![Some(1.0), None, None]);
        assert_eq!(
            null_counts(&table.data),
            vec![("region_id".to_string(), 0), (VALUE.to_string(), 2)]
        );
    }

    #[test]
    fn drops_only_missing_values() {
        let outcome = drop_null_values(home_values(vec![Some(1.5), None, Some(2.25)])).unwrap();

        assert_eq!(outcome.rows_before, 3);
        assert_eq!(outcome.rows_after, 2);
        assert_eq!(outcome.rows_dropped(), 1);
        assert_eq!(outcome.value_sum_before, 3.75);
        assert_eq!(outcome.value_sum_after, 3.75);
        assert_eq!(outcome.table.data.column(VALUE).unwrap().null_count(), 0);
    }

    #[test]
    fn without_nulls_nothing_changes() {
        let outcome = drop_null_values(home_values(vec![Some(1.0), Some(2.0)])).unwrap();
        assert_eq!(outcome.rows_dropped(), 0);
    }
}
