//! Wide to long reshape ("melt") of raw tables.
//!
//! Identifying columns become row keys; every other column is an observation
//! date whose cells are pivoted into (`date`, `value`) pairs. Output rows are
//! ordered observation column first, source row second.

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, error, info, info_span};

use hv_common::{date_to_days, is_missing_token, parse_date, parse_f64, parse_i64, round_to};
use hv_model::columns::{BEDROOMS, COUNTY, DATE, REGION_NAME, STATE, VALUE};
use hv_model::{CaseInsensitiveSet, ID_COLUMNS, IdColumn, IdKind, LONG_COLUMNS, LongTable, RawTable};

use crate::error::{Result, TransformError};

/// Decimal digits kept for observation values.
pub const VALUE_DIGITS: i32 = 2;

/// Reshapes every raw table, stopping at the first failure.
pub fn reshape_all(tables: Vec<RawTable>) -> Result<Vec<LongTable>> {
    let span = info_span!("reshape", tables = tables.len());
    let _guard = span.enter();
    info!("Beginning Transformation process...");

    let mut reshaped = Vec::with_capacity(tables.len());
    for (index, table) in tables.into_iter().enumerate() {
        reshaped.push(reshape(index, table)?);
    }

    info!("Transformation process complete.");
    Ok(reshaped)
}

/// Reshapes the raw table at `index` into long format.
///
/// Failures are logged with the table index before they are returned.
pub fn reshape(index: usize, table: RawTable) -> Result<LongTable> {
    let file = table.source_name();
    let source_rows = table.height();
    match melt(index, &file, &table.data) {
        Ok(data) => {
            info!(
                index,
                source_rows,
                rows = data.height(),
                "Table[{index}] ({file}) reshaped to long format"
            );
            Ok(LongTable::new(table.source, data))
        }
        Err(err) => {
            error!(index, "An error occurred while transforming table[{index}]: {err}");
            Err(err)
        }
    }
}

/// Cell reader that attaches table and column context to parse failures.
struct Cells<'a> {
    index: usize,
    file: &'a str,
    data: &'a DataFrame,
}

impl Cells<'_> {
    /// Trimmed cells; blanks and missing-value spellings (`NA`, `NaN`, ...) are `None`.
    fn text(&self, column: &str) -> Result<Vec<Option<String>>> {
        let strings = self.data.column(column)?.cast(&DataType::String)?;
        let ca = strings.str()?;
        Ok(ca
            .into_iter()
            .map(|cell| {
                cell.map(str::trim)
                    .filter(|s| !is_missing_token(s))
                    .map(str::to_string)
            })
            .collect())
    }

    fn integers(&self, column: &str) -> Result<Vec<Option<i64>>> {
        let cells = self.text(column)?;
        cells
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(raw) => parse_i64(&raw).map(Some).ok_or_else(|| {
                    TransformError::InvalidIdentifier {
                        index: self.index,
                        file: self.file.to_string(),
                        column: column.to_string(),
                        row,
                        value: raw,
                    }
                }),
            })
            .collect()
    }

    /// Integer cells that may not be missing.
    fn required_integers(&self, column: &str) -> Result<Vec<i64>> {
        self.integers(column)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.ok_or_else(|| TransformError::MissingIdentifier {
                    index: self.index,
                    file: self.file.to_string(),
                    column: column.to_string(),
                    row,
                })
            })
            .collect()
    }

    fn values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let cells = self.text(column)?;
        cells
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(raw) => parse_f64(&raw)
                    .map(|v| Some(round_to(v, VALUE_DIGITS)))
                    .ok_or_else(|| TransformError::InvalidValue {
                        index: self.index,
                        file: self.file.to_string(),
                        column: column.to_string(),
                        row,
                        value: raw,
                    }),
            })
            .collect()
    }
}

fn melt(index: usize, file: &str, data: &DataFrame) -> Result<DataFrame> {
    let headers: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let present = CaseInsensitiveSet::new(&headers);

    let mut id_headers = Vec::with_capacity(ID_COLUMNS.len());
    for id in &ID_COLUMNS {
        let header = present
            .get(id.source)
            .or_else(|| present.get(id.name))
            .ok_or_else(|| TransformError::MissingIdColumn {
                index,
                file: file.to_string(),
                column: id.source.to_string(),
            })?;
        id_headers.push(header.to_string());
    }

    let observations = observation_columns(index, file, &headers)?;
    debug!(
        index,
        observation_columns = observations.len(),
        "Identified observation columns"
    );

    let cells = Cells { index, file, data };
    let times = observations.len();
    let mut columns = id_columns(&cells, &id_headers, times)?;

    let rows = data.height();
    let total = rows * times;
    let mut dates = Vec::with_capacity(total);
    let mut values = Vec::with_capacity(total);
    for (header, date) in &observations {
        let days = date_to_days(*date);
        dates.extend(std::iter::repeat_n(days, rows));
        values.extend(cells.values(header)?);
    }

    columns.extend([
        Series::new(DATE.into(), dates)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(VALUE.into(), values).into_column(),
        Series::full_null(BEDROOMS.into(), total, &DataType::Int32).into_column(),
    ]);

    Ok(DataFrame::new(columns)?)
}

/// Non-identifying headers paired with their parsed dates, in file order.
fn observation_columns(
    index: usize,
    file: &str,
    headers: &[String],
) -> Result<Vec<(String, NaiveDate)>> {
    headers
        .iter()
        .filter(|header| !is_id_column(header))
        .map(|header| {
            parse_date(header)
                .map(|date| (header.clone(), date))
                .ok_or_else(|| TransformError::InvalidDateHeader {
                    index,
                    file: file.to_string(),
                    column: header.clone(),
                })
        })
        .collect()
}

fn is_id_column(header: &str) -> bool {
    ID_COLUMNS.iter().any(|id: &IdColumn| id.matches(header))
}

/// Identifying columns typed per [`IdKind`], each source block repeated
/// `times`, followed by the derived `county`.
fn id_columns(cells: &Cells<'_>, headers: &[String], times: usize) -> Result<Vec<Column>> {
    let mut columns = Vec::with_capacity(LONG_COLUMNS.len());
    let mut region_names = Vec::new();
    let mut states = Vec::new();

    // Header order follows ID_COLUMNS.
    for (id, header) in ID_COLUMNS.iter().zip(headers) {
        let name = id.name.into();
        let series = match id.kind {
            IdKind::Integer { required: true } => {
                Series::new(name, repeat_block(&cells.required_integers(header)?, times))
            }
            IdKind::Integer { required: false } => {
                Series::new(name, repeat_block(&cells.integers(header)?, times))
            }
            IdKind::Text => {
                let text = cells.text(header)?;
                let series = Series::new(name, repeat_block(&text, times));
                match id.name {
                    REGION_NAME => region_names = text,
                    STATE => states = text,
                    _ => {}
                }
                series
            }
        };
        columns.push(series.into_column());
    }

    let county = county_labels(&region_names, &states);
    columns.push(Series::new(COUNTY.into(), repeat_block(&county, times)).into_column());
    Ok(columns)
}

/// `"<region name>, <state>"`; missing when either part is missing.
pub fn county_label(region_name: Option<&str>, state: Option<&str>) -> Option<String> {
    match (region_name, state) {
        (Some(name), Some(state)) => Some(format!("{name}, {state}")),
        _ => None,
    }
}

fn county_labels(region_names: &[Option<String>], states: &[Option<String>]) -> Vec<Option<String>> {
    region_names
        .iter()
        .zip(states)
        .map(|(name, state)| county_label(name.as_deref(), state.as_deref()))
        .collect()
}

fn repeat_block<T: Clone>(block: &[T], times: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(block.len() * times);
    for _ in 0..times {
        out.extend_from_slice(block);
    }
    out
}
