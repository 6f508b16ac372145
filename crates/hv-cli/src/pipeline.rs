//! Home value pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Extract**: read every CSV of the data directory
//! 2. **Reshape**: melt each wide table into long format
//! 3. **Merge**: append the long tables with their bedroom count
//! 4. **Split**: project the `regions` and `home_values` tables
//! 5. **Inspect**: print null counts, optionally drop missing values
//! 6. **Export**: write sample CSVs
//! 7. **Load**: behind the commit gate, load both tables in one transaction
//!
//! Each stage takes the output of the previous stage by value and the run
//! stops at the first error.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, info_span, warn};

use hv_ingest::extract;
use hv_model::{
    BedroomPlan, HomeValuesTable, LongTable, MergedTable, RawTable, RegionsTable, TableKind,
};
use hv_store::{DbCredentials, TransactionalLoader};
use hv_transform::{drop_null_values, merge, null_counts, reshape_all, split};

use crate::export::write_sample;
use crate::gates::{CLEAN_NULLS_PROMPT, COMMIT_PROMPT, ConfirmationGate};
use crate::summary::print_null_summary;

/// Where and how much to sample.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub dir: PathBuf,
    pub rows: usize,
}

/// Everything a run needs besides the gates.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub data_dir: PathBuf,
    pub credentials: PathBuf,
    pub bedroom_plan: BedroomPlan,
    /// `None` disables sample export.
    pub samples: Option<SampleOptions>,
    /// Print null counts before the clean gate.
    pub show_nulls: bool,
}

/// The two interactive decisions of a run.
pub struct Gates<'a> {
    pub clean_nulls: &'a mut dyn ConfirmationGate,
    pub commit: &'a mut dyn ConfirmationGate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Committed,
    /// The commit gate was declined; no connection was opened.
    CommitDeclined,
}

#[derive(Debug, Clone, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
    pub rows: usize,
}

/// What the target store holds after the commit.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub target: String,
    pub regions: i64,
    pub home_values: i64,
    pub value_sum: f64,
}

/// Counts gathered along the run; serialized by `--report`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub data_dir: PathBuf,
    pub bedroom_plan: BedroomPlan,
    pub files: Vec<String>,
    pub long_rows: Vec<usize>,
    pub merged_rows: usize,
    pub regions: usize,
    pub home_values: usize,
    pub region_nulls: Vec<NullCount>,
    pub home_value_nulls: Vec<NullCount>,
    pub nulls_dropped: Option<usize>,
    pub samples: Vec<PathBuf>,
    pub outcome: RunOutcome,
    pub store: Option<StoreSummary>,
}

// ============================================================================
// Stages
// ============================================================================

pub fn extract_stage(data_dir: &Path) -> Result<Vec<RawTable>> {
    let start = Instant::now();
    let tables =
        extract(data_dir).with_context(|| format!("extract {}", data_dir.display()))?;
    info!(
        files = tables.len(),
        duration_ms = start.elapsed().as_millis(),
        "Extract stage complete"
    );
    Ok(tables)
}

pub fn reshape_stage(tables: Vec<RawTable>) -> Result<Vec<LongTable>> {
    let start = Instant::now();
    let long = reshape_all(tables).context("reshape")?;
    info!(
        tables = long.len(),
        duration_ms = start.elapsed().as_millis(),
        "Reshape stage complete"
    );
    Ok(long)
}

pub fn merge_stage(tables: Vec<LongTable>, plan: &BedroomPlan) -> Result<MergedTable> {
    let start = Instant::now();
    let merged = merge(tables, plan).context("merge")?;
    info!(
        rows = merged.height(),
        duration_ms = start.elapsed().as_millis(),
        "Merge stage complete"
    );
    Ok(merged)
}

pub fn split_stage(merged: MergedTable) -> Result<(RegionsTable, HomeValuesTable)> {
    let start = Instant::now();
    let (regions, home_values) = split(merged).context("split")?;
    info!(
        regions = regions.height(),
        home_values = home_values.height(),
        duration_ms = start.elapsed().as_millis(),
        "Split stage complete"
    );
    Ok((regions, home_values))
}

/// Loads both tables in one transaction and reads back the stored totals.
pub fn load_stage(
    credentials_path: &Path,
    regions: &RegionsTable,
    home_values: &HomeValuesTable,
) -> Result<StoreSummary> {
    let span = info_span!("load");
    let _guard = span.enter();
    let start = Instant::now();
    info!("Beginning Loading process...");

    let credentials = DbCredentials::from_file(credentials_path).context("read credentials")?;
    let mut loader = TransactionalLoader::connect(&credentials).context("connect")?;
    loader.verify().context("verify connection")?;
    loader.ensure_schema().context("create schema")?;
    loader
        .load(&regions.data, TableKind::Regions.name())
        .context("load regions")?;
    loader
        .load(&home_values.data, TableKind::HomeValues.name())
        .context("load home_values")?;
    loader.commit().context("commit")?;

    let summary = StoreSummary {
        target: credentials.target(),
        regions: loader.row_count(TableKind::Regions).context("count regions")?,
        home_values: loader
            .row_count(TableKind::HomeValues)
            .context("count home_values")?,
        value_sum: loader.value_sum().context("sum home values")?,
    };
    info!(
        regions = summary.regions,
        home_values = summary.home_values,
        value_sum = summary.value_sum,
        duration_ms = start.elapsed().as_millis(),
        "Loading process complete."
    );
    Ok(summary)
}

fn null_summary(df: &DataFrame) -> Vec<NullCount> {
    let rows = df.height();
    null_counts(df)
        .into_iter()
        .map(|(column, nulls)| NullCount {
            column,
            nulls,
            rows,
        })
        .collect()
}

// ============================================================================
// Orchestration
// ============================================================================

/// Runs every stage, asking `gates` before cleaning and before loading.
pub fn run_pipeline(options: &PipelineOptions, gates: Gates<'_>) -> Result<RunReport> {
    let span = info_span!("run", data_dir = %options.data_dir.display());
    let _guard = span.enter();

    let raw = extract_stage(&options.data_dir)?;
    let files: Vec<String> = raw.iter().map(RawTable::source_name).collect();

    let long = reshape_stage(raw)?;
    let long_rows: Vec<usize> = long.iter().map(LongTable::height).collect();

    let merged = merge_stage(long, &options.bedroom_plan)?;
    let merged_rows = merged.height();

    let (regions, mut home_values) = split_stage(merged)?;

    let region_nulls = null_summary(&regions.data);
    let mut home_value_nulls = null_summary(&home_values.data);
    if options.show_nulls {
        print_null_summary(TableKind::Regions.name(), &region_nulls);
        print_null_summary(TableKind::HomeValues.name(), &home_value_nulls);
    }

    let mut nulls_dropped = None;
    if gates.clean_nulls.confirm(CLEAN_NULLS_PROMPT) {
        let outcome = drop_null_values(home_values).context("drop null values")?;
        nulls_dropped = Some(outcome.rows_dropped());
        home_values = outcome.table;
        home_value_nulls = null_summary(&home_values.data);
    }

    let mut samples = Vec::new();
    if let Some(sample) = &options.samples {
        samples.push(write_sample(
            &regions.data,
            TableKind::Regions,
            &sample.dir,
            sample.rows,
        )?);
        samples.push(write_sample(
            &home_values.data,
            TableKind::HomeValues,
            &sample.dir,
            sample.rows,
        )?);
    }

    let mut report = RunReport {
        data_dir: options.data_dir.clone(),
        bedroom_plan: options.bedroom_plan.clone(),
        files,
        long_rows,
        merged_rows,
        regions: regions.height(),
        home_values: home_values.height(),
        region_nulls,
        home_value_nulls,
        nulls_dropped,
        samples,
        outcome: RunOutcome::CommitDeclined,
        store: None,
    };

    if !gates.commit.confirm(COMMIT_PROMPT) {
        warn!("Commit declined; the target store was not touched");
        return Ok(report);
    }

    report.store = Some(load_stage(&options.credentials, &regions, &home_values)?);
    report.outcome = RunOutcome::Committed;
    Ok(report)
}

/// Writes `report` as pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("write run report {}", path.display()))?;
    info!("Run report written to {}", path.display());
    Ok(())
}
