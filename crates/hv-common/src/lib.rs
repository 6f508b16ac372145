//! Shared utilities for the home value ETL crates.

mod polars;

pub use self::polars::{
    DATE_FORMAT, MISSING_TOKENS, any_to_date, any_to_string, date_to_days, days_to_date,
    format_numeric, is_missing_token, parse_date, parse_f64, parse_i64, round_to,
};
