use std::collections::BTreeMap;

use anyhow::Result;
use tracing::info;

use hv_cli::gates::gate_for;
use hv_cli::pipeline::{Gates, PipelineOptions, RunReport, SampleOptions, run_pipeline, write_report};
use hv_model::BedroomPlan;
use hv_store::schema_sql;

use crate::cli::{GateArg, RunArgs};

pub fn run_schema() -> Result<()> {
    println!("{}", schema_sql());
    Ok(())
}

pub fn run_etl(args: &RunArgs) -> Result<RunReport> {
    let options = pipeline_options(args);
    info!(
        plan = options.bedroom_plan.describe(),
        credentials = %options.credentials.display(),
        "Starting home value ETL"
    );

    let mut clean_gate = gate_for(gate_answer(args.clean_nulls));
    let mut commit_gate = gate_for(gate_answer(args.commit));
    let gates = Gates {
        clean_nulls: clean_gate.as_mut(),
        commit: commit_gate.as_mut(),
    };
    let report = run_pipeline(&options, gates)?;

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    Ok(report)
}

fn pipeline_options(args: &RunArgs) -> PipelineOptions {
    PipelineOptions {
        data_dir: args.data_dir.clone(),
        credentials: args.credentials.clone(),
        bedroom_plan: bedroom_plan(args),
        samples: (!args.no_samples).then(|| SampleOptions {
            dir: args.sample_dir.clone(),
            rows: args.sample_rows,
        }),
        show_nulls: !args.no_null_summary,
    }
}

fn bedroom_plan(args: &RunArgs) -> BedroomPlan {
    if args.bedrooms_from_filename {
        BedroomPlan::FromFileName
    } else if !args.bedrooms.is_empty() {
        let map: BTreeMap<String, i32> = args.bedrooms.iter().cloned().collect();
        BedroomPlan::Explicit(map)
    } else {
        BedroomPlan::Positional
    }
}

fn gate_answer(arg: GateArg) -> Option<bool> {
    match arg {
        GateArg::Ask => None,
        GateArg::Yes => Some(true),
        GateArg::No => Some(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn run_args(args: &[&str]) -> RunArgs {
        let mut argv = vec!["homevalue-etl", "run", "data"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Run(args) => args,
            Command::Schema => panic!("expected run"),
        }
    }

    #[test]
    fn null_summary_follows_flag() {
        assert!(pipeline_options(&run_args(&[])).show_nulls);
        assert!(!pipeline_options(&run_args(&["--no-null-summary"])).show_nulls);
    }

    #[test]
    fn bedroom_plan_from_flags() {
        assert_eq!(bedroom_plan(&run_args(&[])), BedroomPlan::Positional);
        assert_eq!(
            bedroom_plan(&run_args(&["--bedrooms-from-filename"])),
            BedroomPlan::FromFileName
        );
        let BedroomPlan::Explicit(map) = bedroom_plan(&run_args(&["--bedrooms", "a.csv=2"])) else {
            panic!("expected explicit plan");
        };
        assert_eq!(map.get("a.csv"), Some(&2));
    }
}
