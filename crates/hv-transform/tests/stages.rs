//! Reshape, merge and split chained over in-memory raw tables.

use std::collections::HashSet;

use polars::prelude::*;
use proptest::prelude::*;

use hv_model::columns::{BEDROOMS, DATE, REGION_ID};
use hv_model::{BedroomPlan, RawTable, TableKind};
use hv_transform::{TransformError, drop_null_values, merge, reshape_all, split};

const ID_HEADERS: [&str; 9] = [
    "RegionID",
    "SizeRank",
    "RegionName",
    "RegionType",
    "StateName",
    "State",
    "Metro",
    "StateCodeFIPS",
    "MunicipalCodeFIPS",
];

const DATES: [&str; 6] = [
    "2000-01-31",
    "2000-02-29",
    "2000-03-31",
    "2000-04-30",
    "2000-05-31",
    "2000-06-30",
];

/// A wide table with `rows` regions (ids 1..=rows) and the first `dates` observation columns.
fn wide_table(file: &str, rows: usize, dates: usize) -> RawTable {
    let mut columns: Vec<Column> = Vec::new();
    for header in ID_HEADERS {
        let cells: Vec<String> = (1..=rows)
            .map(|id| match header {
                "RegionID" => id.to_string(),
                "SizeRank" => (id - 1).to_string(),
                "RegionName" => format!("County {id}"),
                "RegionType" => "county".to_string(),
                "StateName" | "State" => "TX".to_string(),
                "Metro" => "Austin".to_string(),
                "StateCodeFIPS" => "48".to_string(),
                _ => (100 + id).to_string(),
            })
            .collect();
        columns.push(Series::new(header.into(), cells).into_column());
    }
    for date in DATES.iter().take(dates) {
        let cells: Vec<String> = (1..=rows).map(|id| format!("{}.005", id * 1000)).collect();
        columns.push(Series::new((*date).into(), cells).into_column());
    }
    RawTable::new(file, DataFrame::new(columns).unwrap())
}

fn bedrooms(df: &DataFrame) -> Vec<i32> {
    df.column(BEDROOMS)
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

#[test]
fn missing_value_spellings_are_dropped_by_cleaning() {
    let mut table = wide_table("County_zhvi_bdrmcnt_1.csv", 2, 2);
    table
        .data
        .with_column(Series::new(DATES[0].into(), vec!["NaN", "2000.5"]))
        .unwrap();
    table
        .data
        .with_column(Series::new(DATES[1].into(), vec!["1000.25", "NA"]))
        .unwrap();

    let long = reshape_all(vec![table]).unwrap();
    let merged = merge(long, &BedroomPlan::Positional).unwrap();
    let (_, home_values) = split(merged).unwrap();
    let outcome = drop_null_values(home_values).unwrap();

    assert_eq!(outcome.rows_before, 4);
    assert_eq!(outcome.rows_after, 2);
    assert_eq!(outcome.value_sum_before, 3000.75);
    assert_eq!(outcome.value_sum_after, 3000.75);
}

#[test]
fn three_files_two_rows_two_dates() {
    let raw = vec![
        wide_table("County_zhvi_bdrmcnt_1.csv", 2, 2),
        wide_table("County_zhvi_bdrmcnt_2.csv", 2, 2),
        wide_table("County_zhvi_bdrmcnt_3.csv", 2, 2),
    ];

    let long = reshape_all(raw).unwrap();
    assert!(long.iter().all(|table| table.height() == 4));

    let merged = merge(long, &BedroomPlan::Positional).unwrap();
    assert_eq!(merged.height(), 12);
    assert_eq!(
        bedrooms(&merged.data),
        vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]
    );

    let (regions, home_values) = split(merged).unwrap();
    assert_eq!(regions.height(), 2);
    assert_eq!(home_values.height(), 12);
}

#[test]
fn file_name_plan_matches_positional_for_upstream_names() {
    let raw = vec![
        wide_table("County_zhvi_bdrmcnt_1.csv", 1, 1),
        wide_table("County_zhvi_bdrmcnt_2.csv", 1, 1),
    ];
    let merged = merge(reshape_all(raw).unwrap(), &BedroomPlan::FromFileName).unwrap();
    assert_eq!(bedrooms(&merged.data), vec![1, 2]);
}

#[test]
fn missing_region_column_stops_before_projection() {
    let raw = vec![wide_table("a.csv", 2, 1)];
    let mut merged = merge(reshape_all(raw).unwrap(), &BedroomPlan::Positional).unwrap();
    merged.data = merged.data.drop("county").unwrap();

    match split(merged) {
        Err(TransformError::MissingColumns { table, columns }) => {
            assert_eq!(table, TableKind::Regions);
            assert_eq!(columns, vec!["county".to_string()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn row_counts_and_bedrooms_are_conserved(
        shapes in prop::collection::vec((1usize..5, 1usize..=DATES.len()), 1..5)
    ) {
        let raw: Vec<RawTable> = shapes
            .iter()
            .enumerate()
            .map(|(i, (rows, dates))| wide_table(&format!("source_{i}.csv"), *rows, *dates))
            .collect();

        let long = reshape_all(raw).unwrap();
        for (table, (rows, dates)) in long.iter().zip(&shapes) {
            prop_assert_eq!(table.height(), rows * dates);
        }

        let merged = merge(long, &BedroomPlan::Positional).unwrap();
        let expected: Vec<i32> = shapes
            .iter()
            .enumerate()
            .flat_map(|(i, (rows, dates))| std::iter::repeat_n(i as i32 + 1, rows * dates))
            .collect();
        prop_assert_eq!(bedrooms(&merged.data), expected);

        let (regions, home_values) = split(merged).unwrap();
        let max_rows = shapes.iter().map(|(rows, _)| *rows).max().unwrap();
        prop_assert_eq!(regions.height(), max_rows);

        let ids: Vec<i64> = regions
            .data
            .column(REGION_ID)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        let unique: HashSet<i64> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());

        let mut keys = HashSet::new();
        for idx in 0..home_values.height() {
            let key = (
                home_values.data.column(REGION_ID).unwrap().get(idx).unwrap().to_string(),
                home_values.data.column(DATE).unwrap().get(idx).unwrap().to_string(),
                home_values.data.column(BEDROOMS).unwrap().get(idx).unwrap().to_string(),
            );
            prop_assert!(keys.insert(key));
        }
    }
}
