//! Transformation stages of the home value pipeline.
//!
//! - [`reshape`]: wide raw tables into long format
//! - [`merge`]: long tables into one, with the bedroom discriminant
//! - [`split`]: the merged table into `regions` and `home_values`
//! - [`clean`]: null inspection and removal

pub mod clean;
pub mod error;
pub mod merge;
pub mod reshape;
pub mod split;

pub use clean::{CleanOutcome, drop_null_values, null_counts};
pub use error::{Result, TransformError};
pub use merge::merge;
pub use reshape::{VALUE_DIGITS, county_label, reshape, reshape_all};
pub use split::split;
