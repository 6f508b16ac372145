//! Polars AnyValue utility functions.
//!
//! Helpers for reading individual cells out of DataFrames and for the
//! numeric and calendar conversions shared by the pipeline stages.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

/// Calendar format used for observation date headers and stored dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, formats floats without trailing zeros
/// and dates as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use hv_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("Cook County")), "Cook County");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Date(days) => days_to_date(days)
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        other => {
            let s = other.to_string();
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                s[1..s.len() - 1].to_string()
            } else {
                s
            }
        }
    }
}

/// Formats a floating-point number as a string without trailing zeros after decimal.
///
/// ```
/// use hv_common::format_numeric;
///
/// assert_eq!(format_numeric(250000.0), "250000");
/// assert_eq!(format_numeric(1234.50), "1234.5");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

/// Converts a `Date` `AnyValue` (days since the Unix epoch) to a calendar date.
pub fn any_to_date(value: AnyValue<'_>) -> Option<NaiveDate> {
    match value {
        AnyValue::Date(days) => days_to_date(days),
        AnyValue::String(s) => parse_date(s),
        AnyValue::StringOwned(s) => parse_date(&s),
        _ => None,
    }
}

/// Cell spellings read as missing, the default set of the pandas CSV reader.
pub const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when a cell (after trimming) spells a missing value.
pub fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// Parses a string as a finite `f64`, returning `None` for invalid, empty or
/// non-finite input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
///
/// Integral float spellings (`"17.0"`) are accepted because spreadsheet
/// exports often write codes that way.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_f64))
}

/// Parses a `YYYY-MM-DD` string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Rounds to the given number of decimal digits, ties to even.
///
/// ```
/// use hv_common::round_to;
///
/// assert_eq!(round_to(123456.789, 2), 123456.79);
/// assert_eq!(round_to(-0.125, 2), -0.12);
/// assert_eq!(round_to(0.375, 2), 0.38);
/// ```
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(Duration::days(i64::from(days)))
}

fn whole_f64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1");
        assert_eq!(any_to_string(AnyValue::Float64(310250.25)), "310250.25");
    }

    #[test]
    fn test_any_to_string_date() {
        let days = date_to_days(NaiveDate::from_ymd_opt(2000, 1, 31).unwrap());
        assert_eq!(any_to_string(AnyValue::Date(days)), "2000-01-31");
    }

    #[test]
    fn test_format_numeric_keeps_integer_zeros() {
        assert_eq!(format_numeric(40.0), "40");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(40.50), "40.5");
    }

    #[test]
    fn test_parse_i64_accepts_integral_floats() {
        assert_eq!(parse_i64(""), None);
        assert_eq!(parse_i64("  -100  "), Some(-100));
        assert_eq!(parse_i64("31.0"), Some(31));
        assert_eq!(parse_i64("31.2"), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-31"), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(parse_date("01/31/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005_f64 * 1000.0, 2), 1005.0);
        assert_eq!(round_to(99.999, 2), 100.0);
        assert_eq!(round_to(12.344, 2), 12.34);
        assert!(round_to(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_round_to_ties_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(100000.125, 2), 100000.12);
        assert_eq!(round_to(100000.375, 2), 100000.38);
    }

    #[test]
    fn test_missing_tokens() {
        for token in ["", " ", "NA", "N/A", "n/a", "null", "NULL", "NaN", "-nan", "<NA>", "None"] {
            assert!(is_missing_token(token), "{token:?}");
        }
        assert!(!is_missing_token("0"));
        assert!(!is_missing_token("Nassau County"));
    }

    #[test]
    fn test_parse_f64_rejects_non_finite() {
        assert_eq!(parse_f64(" 2.5 "), Some(2.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("-infinity"), None);
    }

    #[test]
    fn test_date_days_round_trip() {
        let date = NaiveDate::from_ymd_opt(1996, 4, 30).unwrap();
        let days = date_to_days(date);
        assert_eq!(days_to_date(days), Some(date));
        assert_eq!(date_to_days(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
    }
}
