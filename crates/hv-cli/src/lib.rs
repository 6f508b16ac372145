//! CLI library components for the home value ETL.

pub mod export;
pub mod gates;
pub mod logging;
pub mod pipeline;
pub mod summary;
