//! Derived variables: protein ratios and threshold flags
//!
//! Every builder reads its inputs as `Option<f64>` and writes a `Float64`
//! column where `None` is the missing marker. Missingness is never coerced
//! into the negative category.

use polars::prelude::*;

use super::error::AnalysisError;
use super::loader::{
    column_values, ANIMAL_PROTEIN, BMI, CRP, DIASTOLIC_BP, SYSTOLIC_BP, TOTAL_PROTEIN,
    VEGETABLE_PROTEIN,
};

/// BMI above which a subject is overweight
pub const OVERWEIGHT_BMI: f64 = 25.0;
/// CRP (mg/L) above which inflammation is elevated
pub const ELEVATED_CRP: f64 = 3.0;
/// Systolic pressure above which blood pressure is high
pub const HIGH_SYSTOLIC: f64 = 140.0;
/// Diastolic pressure above which blood pressure is high
pub const HIGH_DIASTOLIC: f64 = 90.0;

pub const APTP_RATIO: &str = "aptp_ratio";
pub const VPTP_RATIO: &str = "vptp_ratio";
pub const OVERWEIGHT: &str = "overweight";
pub const CRP_CATEGORY: &str = "crp_cate";
pub const HIGH_BP: &str = "hbp";

/// Row-wise ratio; missing when either side is missing or the denominator is zero
pub fn ratio_values(numerator: &[Option<f64>], denominator: &[Option<f64>]) -> Vec<Option<f64>> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d),
            _ => None,
        })
        .collect()
}

/// 1.0 above `threshold`, 0.0 at or below, missing stays missing
pub fn threshold_values(source: &[Option<f64>], threshold: f64) -> Vec<Option<f64>> {
    source
        .iter()
        .map(|v| v.map(|x| if x > threshold { 1.0 } else { 0.0 }))
        .collect()
}

/// `a > ta OR b > tb`, missing exactly where `b` is missing.
///
/// A missing `a` counts as not exceeding its threshold.
pub fn any_exceeds_values(
    a: &[Option<f64>],
    a_threshold: f64,
    b: &[Option<f64>],
    b_threshold: f64,
) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(a, b)| {
            b.map(|b| {
                let a_high = a.is_some_and(|a| a > a_threshold);
                if a_high || b > b_threshold {
                    1.0
                } else {
                    0.0
                }
            })
        })
        .collect()
}

fn with_values(df: &DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<DataFrame, AnalysisError> {
    let mut out = df.clone();
    out.with_column(Series::new(name.into(), values))?;
    Ok(out)
}

/// Append `name = numerator / denominator`
pub fn with_ratio(
    df: &DataFrame,
    name: &str,
    numerator: &str,
    denominator: &str,
) -> Result<DataFrame, AnalysisError> {
    let num = column_values(df, numerator)?;
    let den = column_values(df, denominator)?;
    with_values(df, name, ratio_values(&num, &den))
}

/// Append `name = source > threshold` as 1.0/0.0/missing
pub fn with_threshold_flag(
    df: &DataFrame,
    name: &str,
    source: &str,
    threshold: f64,
) -> Result<DataFrame, AnalysisError> {
    let values = column_values(df, source)?;
    with_values(df, name, threshold_values(&values, threshold))
}

/// Append `name = a > ta OR b > tb`, with missingness taken from `b`
pub fn with_any_exceeds_flag(
    df: &DataFrame,
    name: &str,
    (a, a_threshold): (&str, f64),
    (b, b_threshold): (&str, f64),
) -> Result<DataFrame, AnalysisError> {
    let a_values = column_values(df, a)?;
    let b_values = column_values(df, b)?;
    with_values(
        df,
        name,
        any_exceeds_values(&a_values, a_threshold, &b_values, b_threshold),
    )
}

/// Add the standard survey variables: protein ratios, overweight, CRP category and hbp
pub fn build_derived_variables(df: &DataFrame) -> Result<DataFrame, AnalysisError> {
    let df = with_ratio(df, APTP_RATIO, ANIMAL_PROTEIN, TOTAL_PROTEIN)?;
    let df = with_ratio(&df, VPTP_RATIO, VEGETABLE_PROTEIN, TOTAL_PROTEIN)?;
    let df = with_threshold_flag(&df, OVERWEIGHT, BMI, OVERWEIGHT_BMI)?;
    let df = with_threshold_flag(&df, CRP_CATEGORY, CRP, ELEVATED_CRP)?;
    let df = with_any_exceeds_flag(
        &df,
        HIGH_BP,
        (SYSTOLIC_BP, HIGH_SYSTOLIC),
        (DIASTOLIC_BP, HIGH_DIASTOLIC),
    )?;

    log::info!(
        "Derived {}, {}, {}, {}, {}",
        APTP_RATIO,
        VPTP_RATIO,
        OVERWEIGHT,
        CRP_CATEGORY,
        HIGH_BP
    );
    Ok(df)
}
