//! End-to-end runs over fixture directories and a temporary SQLite store.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use hv_cli::gates::{COMMIT_PROMPT, ConfirmationGate, FixedAnswer};
use hv_cli::pipeline::{Gates, PipelineOptions, RunOutcome, SampleOptions, run_pipeline};
use hv_model::BedroomPlan;

const HEADER: &str = "RegionID,SizeRank,RegionName,RegionType,StateName,State,Metro,StateCodeFIPS,MunicipalCodeFIPS,2000-01-31,2000-02-29";

struct Fixture {
    _dir: TempDir,
    data_dir: PathBuf,
    credentials: PathBuf,
    database: PathBuf,
    samples: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();
    for bedrooms in 1..=3 {
        let base = 100000 * bedrooms;
        // Cook County has no value for the second month in the 2-bedroom file.
        let cook_feb = if bedrooms == 2 {
            String::new()
        } else {
            (base + 500).to_string()
        };
        let content = format!(
            "{HEADER}\n\
             3101,0,Los Angeles County,county,CA,CA,Los Angeles-Long Beach-Anaheim,6,37,{},{}\n\
             139,1,Cook County,county,IL,IL,Chicago-Naperville-Elgin,17,31,{},{}\n",
            format!("{base}.123"),
            base + 100,
            base + 400,
            cook_feb,
        );
        fs::write(
            data_dir.join(format!("County_zhvi_bdrmcnt_{bedrooms}.csv")),
            content,
        )
        .unwrap();
    }

    let database = dir.path().join("homes.db");
    let credentials = dir.path().join("db_config.txt");
    fs::write(
        &credentials,
        format!(
            "db_username=etl\ndb_password=secret\ndb_host=localhost\ndb_port=5432\ndb_name={}\n",
            database.display()
        ),
    )
    .unwrap();

    let samples = dir.path().join("samples");
    Fixture {
        data_dir,
        credentials,
        database,
        samples,
        _dir: dir,
    }
}

fn options(fixture: &Fixture) -> PipelineOptions {
    PipelineOptions {
        data_dir: fixture.data_dir.clone(),
        credentials: fixture.credentials.clone(),
        bedroom_plan: BedroomPlan::Positional,
        samples: Some(SampleOptions {
            dir: fixture.samples.clone(),
            rows: 5,
        }),
        show_nulls: false,
    }
}

/// Answers with a fixed value and remembers every prompt.
struct RecordingGate {
    answer: bool,
    prompts: Vec<String>,
}

impl ConfirmationGate for RecordingGate {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }
}

/// Reads a row count back through a fresh loader.
fn count_rows(database: &Path, table: &str) -> i64 {
    let credentials =
        hv_store::DbCredentials::for_database(database.to_string_lossy().into_owned());
    let mut loader = hv_store::TransactionalLoader::connect(&credentials).unwrap();
    let kind = hv_model::TableKind::from_name(table).unwrap();
    loader.row_count(kind).unwrap()
}

#[test]
fn full_run_loads_both_tables() {
    let fixture = fixture();
    let mut clean = FixedAnswer(false);
    let mut commit = RecordingGate {
        answer: true,
        prompts: Vec::new(),
    };

    let report = run_pipeline(
        &options(&fixture),
        Gates {
            clean_nulls: &mut clean,
            commit: &mut commit,
        },
    )
    .unwrap();

    assert_eq!(commit.prompts, vec![COMMIT_PROMPT.to_string()]);
    assert_eq!(report.outcome, RunOutcome::Committed);
    assert_eq!(
        report.files,
        vec![
            "County_zhvi_bdrmcnt_1.csv",
            "County_zhvi_bdrmcnt_2.csv",
            "County_zhvi_bdrmcnt_3.csv",
        ]
    );
    assert_eq!(report.long_rows, vec![4, 4, 4]);
    assert_eq!(report.merged_rows, 12);
    assert_eq!(report.regions, 2);
    assert_eq!(report.home_values, 12);
    assert_eq!(report.nulls_dropped, None);

    let value_nulls = report
        .home_value_nulls
        .iter()
        .find(|count| count.column == "value")
        .unwrap();
    assert_eq!(value_nulls.nulls, 1);

    let store = report.store.unwrap();
    assert_eq!(store.regions, 2);
    assert_eq!(store.home_values, 12);
    assert_eq!(count_rows(&fixture.database, "home_values"), 12);

    assert!(fixture.samples.join("regions.csv").is_file());
    assert!(fixture.samples.join("home_values.csv").is_file());
}

#[test]
fn cleaning_drops_missing_values_before_load() {
    let fixture = fixture();
    let mut clean = FixedAnswer(true);
    let mut commit = FixedAnswer(true);

    let report = run_pipeline(
        &options(&fixture),
        Gates {
            clean_nulls: &mut clean,
            commit: &mut commit,
        },
    )
    .unwrap();

    assert_eq!(report.nulls_dropped, Some(1));
    assert_eq!(report.home_values, 11);
    assert_eq!(report.store.unwrap().home_values, 11);
}

#[test]
fn missing_value_spellings_are_cleaned_like_blanks() {
    let fixture = fixture();
    fs::write(
        fixture.data_dir.join("County_zhvi_bdrmcnt_3.csv"),
        format!(
            "{HEADER}\n\
             3101,0,Los Angeles County,county,CA,CA,Los Angeles-Long Beach-Anaheim,6,37,300000,NaN\n\
             139,1,Cook County,county,IL,IL,Chicago-Naperville-Elgin,17,31,NA,300500\n"
        ),
    )
    .unwrap();
    let mut clean = FixedAnswer(true);
    let mut commit = FixedAnswer(true);

    let report = run_pipeline(
        &options(&fixture),
        Gates {
            clean_nulls: &mut clean,
            commit: &mut commit,
        },
    )
    .unwrap();

    assert_eq!(report.nulls_dropped, Some(3));
    assert_eq!(report.home_values, 9);
    let store = report.store.unwrap();
    assert_eq!(store.home_values, 9);
    assert!(store.value_sum.is_finite());
    assert!(store.value_sum > 0.0);
}

#[test]
fn declined_commit_never_touches_the_store() {
    let fixture = fixture();
    let mut clean = FixedAnswer(false);
    let mut commit = FixedAnswer(false);

    let report = run_pipeline(
        &options(&fixture),
        Gates {
            clean_nulls: &mut clean,
            commit: &mut commit,
        },
    )
    .unwrap();

    assert_eq!(report.outcome, RunOutcome::CommitDeclined);
    assert!(report.store.is_none());
    assert!(!fixture.database.exists());
    assert_eq!(report.samples.len(), 2);
}

#[test]
fn malformed_source_stops_the_run() {
    let fixture = fixture();
    fs::write(
        fixture.data_dir.join("County_zhvi_bdrmcnt_4.csv"),
        "RegionID,SizeRank,RegionName,RegionType,StateName,State,Metro,StateCodeFIPS,MunicipalCodeFIPS,January\n1,0,A,county,CA,CA,M,6,1,5\n",
    )
    .unwrap();
    let mut clean = FixedAnswer(false);
    let mut commit = FixedAnswer(true);

    let error = run_pipeline(
        &options(&fixture),
        Gates {
            clean_nulls: &mut clean,
            commit: &mut commit,
        },
    )
    .unwrap_err();

    let message = format!("{error:#}");
    assert!(message.contains("reshape"), "{message}");
    assert!(message.contains("January"), "{message}");
    assert!(!fixture.database.exists());
}
