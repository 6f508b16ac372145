//! CLI argument definitions for the home value ETL.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "homevalue-etl",
    version,
    about = "Load wide home value exports into a relational store",
    long_about = "Load wide home value exports into a relational store.\n\n\
                  Reads one CSV per bedroom count, reshapes every file to long format,\n\
                  merges them with a bedrooms column and loads the regions and\n\
                  home_values tables in a single transaction."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust console verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit console log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Console log format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Progress log file; lines are appended as `<timestamp>,<message>`.
    #[arg(
        long = "log-file",
        value_name = "PATH",
        default_value = "logfile.txt",
        global = true
    )]
    pub log_file: PathBuf,

    /// Do not write the progress log file.
    #[arg(long = "no-log-file", global = true)]
    pub no_log_file: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full extract, transform and load pipeline.
    Run(RunArgs),

    /// Print the target schema DDL.
    Schema,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding one CSV export per bedroom count.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Credential file with db_username, db_password, db_host, db_port and db_name.
    #[arg(long = "credentials", value_name = "PATH", default_value = "db_config.txt")]
    pub credentials: PathBuf,

    /// Drop home values without a value before export and load.
    #[arg(long = "clean-nulls", value_enum, default_value = "ask")]
    pub clean_nulls: GateArg,

    /// Load and commit the results into the target store.
    ///
    /// Declining ends the run without opening a connection.
    #[arg(long = "commit", value_enum, default_value = "ask")]
    pub commit: GateArg,

    /// Bedroom count for a source file, as FILE_NAME=N (repeatable).
    ///
    /// When given, every source file must be listed.
    #[arg(
        long = "bedrooms",
        value_name = "FILE=N",
        value_parser = parse_bedroom_mapping,
        conflicts_with = "bedrooms_from_filename"
    )]
    pub bedrooms: Vec<(String, i32)>,

    /// Read the bedroom count from the `bdrmcnt_<N>` part of each file name.
    #[arg(long = "bedrooms-from-filename")]
    pub bedrooms_from_filename: bool,

    /// Directory for the regions.csv and home_values.csv samples.
    #[arg(long = "sample-dir", value_name = "DIR", default_value = ".")]
    pub sample_dir: PathBuf,

    /// Number of rows written to each sample file.
    #[arg(long = "sample-rows", value_name = "N", default_value_t = 1000)]
    pub sample_rows: usize,

    /// Skip writing sample files.
    #[arg(long = "no-samples")]
    pub no_samples: bool,

    /// Skip the per-column null count tables.
    #[arg(long = "no-null-summary")]
    pub no_null_summary: bool,

    /// Write a JSON run report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Answer source for a yes/no gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GateArg {
    /// Prompt on the terminal (answers no when stdin is not a terminal).
    Ask,
    Yes,
    No,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_bedroom_mapping(raw: &str) -> Result<(String, i32), String> {
    let (name, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=N, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing file name in '{raw}'"));
    }
    let count = count
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid bedroom count in '{raw}'"))?;
    Ok((name.to_string(), count))
}
