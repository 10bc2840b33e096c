//! Sentinel missing-value normalization and missing value analysis

use anyhow::Result;
use polars::prelude::*;

/// Numeric codes the survey uses for "not recorded"
pub const DEFAULT_SENTINELS: [f64; 4] = [888888.0, 88888.0, 8888.0, 888.0];

fn is_sentinel(value: f64, sentinels: &[f64]) -> bool {
    sentinels.iter().any(|&s| s == value)
}

/// Replace every sentinel code (and NaN) in every numeric column with null.
///
/// Numeric columns come back as `Float64`; other columns pass through
/// untouched. Must run before any derived variable is computed so that
/// sentinel codes never leak into ratios or thresholds.
pub fn normalize_missing(df: &DataFrame, sentinels: &[f64]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            columns.push(column.clone());
            continue;
        }

        let float_col = column.cast(&DataType::Float64)?;
        let cleaned: Vec<Option<f64>> = float_col
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan() && !is_sentinel(*x, sentinels)))
            .collect();

        columns.push(Column::new(column.name().clone(), cleaned));
    }

    DataFrame::new(columns)
}

/// Count sentinel cells per numeric column, skipping columns with none
pub fn count_sentinels(df: &DataFrame, sentinels: &[f64]) -> PolarsResult<Vec<(String, usize)>> {
    let mut counts = Vec::new();

    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }
        let float_col = column.cast(&DataType::Float64)?;
        let count = float_col
            .f64()?
            .into_iter()
            .flatten()
            .filter(|&v| is_sentinel(v, sentinels))
            .count();
        if count > 0 {
            counts.push((column.name().to_string(), count));
        }
    }

    Ok(counts)
}

/// Missing ratio per column, sorted descending
pub fn analyze_missing_values(df: &DataFrame) -> Result<Vec<(String, f64)>> {
    // Handle empty DataFrame
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let rows = df.height() as f64;
    let mut missing_ratios: Vec<(String, f64)> = df
        .get_columns()
        .iter()
        .map(|column| {
            (
                column.name().to_string(),
                column.null_count() as f64 / rows,
            )
        })
        .collect();

    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(missing_ratios)
}
