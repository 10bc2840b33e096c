//! Dataset loader for CSV and Parquet files, with typed column access

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::error::AnalysisError;
use crate::utils::{create_spinner, finish_with_success};

/// Animal protein intake
pub const ANIMAL_PROTEIN: &str = "ani_prot";
/// Vegetable protein intake
pub const VEGETABLE_PROTEIN: &str = "veg_prot";
/// Total protein intake
pub const TOTAL_PROTEIN: &str = "tot_prot_2";
/// Body mass index
pub const BMI: &str = "bmi";
/// C-reactive protein (inflammation marker)
pub const CRP: &str = "CRP";
/// Systolic blood pressure
pub const SYSTOLIC_BP: &str = "sbp";
/// Diastolic blood pressure
pub const DIASTOLIC_BP: &str = "dbp";

/// Columns every input file must provide
pub const REQUIRED_COLUMNS: [&str; 7] = [
    ANIMAL_PROTEIN,
    VEGETABLE_PROTEIN,
    TOTAL_PROTEIN,
    BMI,
    CRP,
    SYSTOLIC_BP,
    DIASTOLIC_BP,
];

/// Load a dataset lazily from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Load and collect a dataset behind a spinner.
///
/// Returns the DataFrame with its row count, column count and estimated
/// memory footprint in MB.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let lf = load_dataset(path, infer_schema_length)?;

    let spinner = create_spinner("Loading dataset...");
    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    log::info!(
        "Loaded {} ({} rows x {} columns, {:.2} MB)",
        path.display(),
        rows,
        cols,
        memory_mb
    );

    Ok((df, rows, cols, memory_mb))
}

/// Fail fast when any of `required` is absent from the dataset.
pub fn validate_schema(df: &DataFrame, required: &[&str]) -> Result<(), AnalysisError> {
    let present = column_names(df);
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::MissingColumns { missing })
    }
}

/// All column names, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Look up a column by name, reporting the available columns on failure
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, AnalysisError> {
    df.column(name).map_err(|_| AnalysisError::MissingColumn {
        column: name.to_string(),
        available: column_names(df),
    })
}

/// Read a column as optional floats; nulls and NaN both come back as `None`
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, AnalysisError> {
    let column = require_column(df, name)?;
    let float_col = column.cast(&DataType::Float64)?;
    let values = float_col
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}
