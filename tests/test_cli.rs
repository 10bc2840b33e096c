//! Tests for CLI argument parsing and the protlogit binary

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use protlogit::cli::Cli;
use protlogit::pipeline::{BloodPressureStatus, WeightStatus};
use std::path::PathBuf;

mod common;

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from([
        "protlogit",
        "--input",
        "survey.csv",
        "--outcome",
        "hbp",
        "--predictor",
        "vptp_ratio",
    ]);

    assert_eq!(cli.input, PathBuf::from("survey.csv"));
    assert_eq!(cli.outcome, "hbp");
    assert_eq!(cli.predictor, "vptp_ratio");
    assert_eq!(cli.display_var, "bmi");
    assert_eq!(cli.weight_status, WeightStatus::All);
    assert_eq!(cli.bp_status, BloodPressureStatus::All);
    assert_eq!(cli.max_iterations, 35);
    assert!((cli.tolerance - 1e-8).abs() < 1e-20);
    assert!(cli.export.is_none());
    assert!(cli.save_derived.is_none());
    assert!(!cli.no_plots);
    assert_eq!(cli.infer_schema_length, 10000);
}

#[test]
fn test_cli_numeric_selector_codes() {
    let cli = Cli::parse_from([
        "protlogit",
        "-i",
        "survey.csv",
        "--outcome",
        "overweight",
        "--predictor",
        "aptp_ratio",
        "--weight-status",
        "1",
        "--bp-status",
        "0",
    ]);

    assert_eq!(cli.weight_status, WeightStatus::Overweight);
    assert_eq!(cli.bp_status, BloodPressureStatus::Normal);
    assert_eq!(cli.cohort().to_string(), "weight=overweight, bp=normal");
}

#[test]
fn test_cli_request_and_solver_settings() {
    let cli = Cli::parse_from([
        "protlogit",
        "-i",
        "survey.parquet",
        "--outcome",
        "crp_cate",
        "--predictor",
        "CRP",
        "--display-var",
        "sbp",
        "--bp-status",
        "high",
        "--max-iterations",
        "100",
        "--tolerance",
        "1e-6",
    ]);

    let request = cli.request();
    assert_eq!(request.outcome, "crp_cate");
    assert_eq!(request.predictor, "CRP");
    assert_eq!(request.display_variable, "sbp");
    assert_eq!(request.cohort.blood_pressure, BloodPressureStatus::High);

    let config = cli.logit_config();
    assert_eq!(config.max_iterations, 100);
    assert!((config.tolerance - 1e-6).abs() < 1e-18);
}

#[test]
fn test_cli_rejects_unknown_selector() {
    let result = Cli::try_parse_from([
        "protlogit",
        "-i",
        "survey.csv",
        "--outcome",
        "hbp",
        "--predictor",
        "bmi",
        "--weight-status",
        "3",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_out_of_range_tolerance() {
    let result = Cli::try_parse_from([
        "protlogit",
        "-i",
        "survey.csv",
        "--outcome",
        "hbp",
        "--predictor",
        "bmi",
        "--tolerance",
        "1.5",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_requires_outcome_and_predictor() {
    assert!(Cli::try_parse_from(["protlogit", "-i", "survey.csv"]).is_err());
}

#[test]
fn test_binary_runs_analysis_and_exports() {
    let mut df = common::create_survey_dataframe();
    let (temp_dir, path) = common::create_temp_csv(&mut df);
    let export_path = temp_dir.path().join("analysis.json");

    Command::cargo_bin("protlogit")
        .unwrap()
        .arg("--input")
        .arg(&path)
        .args(["--outcome", "hbp", "--predictor", "vptp_ratio", "--no-plots"])
        .arg("--export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis complete!"));

    let json = std::fs::read_to_string(&export_path).unwrap();
    assert!(json.contains("\"vptp_ratio\""));
}

#[test]
fn test_binary_saves_derived_dataset() {
    let mut df = common::create_survey_dataframe();
    let (temp_dir, path) = common::create_temp_csv(&mut df);
    let derived_path = temp_dir.path().join("derived.csv");

    Command::cargo_bin("protlogit")
        .unwrap()
        .arg("-i")
        .arg(&path)
        .args(["--outcome", "overweight", "--predictor", "aptp_ratio", "--no-plots"])
        .arg("--save-derived")
        .arg(&derived_path)
        .assert()
        .success();

    let header = std::fs::read_to_string(&derived_path).unwrap();
    let first_line = header.lines().next().unwrap();
    for column in ["aptp_ratio", "vptp_ratio", "overweight", "crp_cate", "hbp"] {
        assert!(first_line.contains(column), "Missing {} in {}", column, first_line);
    }
}

#[test]
fn test_binary_fails_on_missing_required_column() {
    let mut df = common::create_survey_dataframe().drop("CRP").unwrap();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    Command::cargo_bin("protlogit")
        .unwrap()
        .arg("-i")
        .arg(&path)
        .args(["--outcome", "hbp", "--predictor", "bmi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CRP"));
}
