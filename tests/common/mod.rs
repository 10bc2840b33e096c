//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// A small survey with every required column and a sprinkling of sentinel codes.
///
/// Row 2 has `ani_prot` coded 888 and row 5 has `dbp` coded 8888; row 7 has
/// `tot_prot_2` = 0.
pub fn create_survey_dataframe() -> DataFrame {
    df! {
        "id" => ["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"],
        "ani_prot" => [10.0f64, 30.0, 888.0, 45.0, 20.0, 35.0, 12.0, 5.0],
        "veg_prot" => [30.0f64, 10.0, 25.0, 15.0, 40.0, 20.0, 18.0, 5.0],
        "tot_prot_2" => [40.0f64, 40.0, 50.0, 60.0, 60.0, 55.0, 30.0, 0.0],
        "bmi" => [22.0f64, 31.0, 25.0, 28.5, 888888.0, 24.0, 35.0, 26.0],
        "CRP" => [1.0f64, 4.5, 3.0, 6.2, 0.8, 2.0, 88888.0, 3.5],
        "sbp" => [118.0f64, 150.0, 140.0, 135.0, 128.0, 145.0, 160.0, 120.0],
        "dbp" => [76.0f64, 95.0, 90.0, 92.0, 80.0, 8888.0, 85.0, 70.0],
    }
    .unwrap()
}

/// Synthetic cohort where `x` drives P(y = 1) through a logistic link
/// with intercept -1 and slope 2.
pub fn create_logistic_dataframe(rows: usize, seed: u64) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let x: Vec<f64> = (0..rows).map(|_| rng.gen_range(-2.0..2.0)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| {
            let p = 1.0 / (1.0 + (-(-1.0 + 2.0 * xi)).exp());
            if rng.gen::<f64>() < p {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    let bmi: Vec<f64> = (0..rows).map(|_| rng.gen_range(18.0..40.0)).collect();
    let sbp: Vec<f64> = (0..rows).map(|_| rng.gen_range(100.0..180.0)).collect();
    let dbp: Vec<f64> = (0..rows).map(|_| rng.gen_range(60.0..110.0)).collect();

    df! {
        "y" => y,
        "x" => x,
        "bmi" => bmi,
        "sbp" => sbp,
        "dbp" => dbp,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Read a Float64 column as options
pub fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert two optional float vectors match within tolerance
pub fn assert_values_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
    assert_eq!(actual.len(), expected.len(), "Length mismatch: {:?} vs {:?}", actual, expected);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        match (a, e) {
            (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "Row {}: expected {}, got {}", i, e, a),
            (None, None) => {}
            _ => panic!("Row {}: expected {:?}, got {:?}", i, e, a),
        }
    }
}
