//! Descriptive statistics and histogram binning for a cohort

use polars::prelude::*;
use serde::Serialize;

use super::error::AnalysisError;
use super::loader::column_values;

/// Default number of equal-width histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Count, moments and quartiles for one numeric column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Non-missing values
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Quantile with linear interpolation between order statistics.
/// `sorted` must be ascending and non-empty.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl ColumnSummary {
    pub fn from_values(name: &str, values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = present.len();
        let mean = (count > 0).then(|| present.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = present.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        let q = |p: f64| (count > 0).then(|| quantile_sorted(&present, p));

        Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: present.first().copied(),
            q25: q(0.25),
            median: q(0.5),
            q75: q(0.75),
            max: present.last().copied(),
        }
    }
}

/// Summaries for every numeric column, in column order
pub fn describe(df: &DataFrame) -> Result<Vec<ColumnSummary>, AnalysisError> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| {
            let values = column_values(df, col.name())?;
            Ok(ColumnSummary::from_values(col.name(), &values))
        })
        .collect()
}

/// One histogram bar, `[lower, upper)` except the last which is closed
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width frequency summary of one variable
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub variable: String,
    pub bins: Vec<HistogramBin>,
    /// Rows excluded because the value was missing
    pub missing: usize,
}

impl Histogram {
    /// Bin the non-missing values into `n_bins` equal-width bins over `[min, max]`.
    ///
    /// A constant variable is binned over `[v - 0.5, v + 0.5]`. All-missing
    /// input yields no bins.
    pub fn from_values(variable: &str, values: &[Option<f64>], n_bins: usize) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - present.len();

        if present.is_empty() || n_bins == 0 {
            return Self {
                variable: variable.to_string(),
                bins: Vec::new(),
                missing,
            };
        }

        let mut lo = present.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / n_bins as f64;
        let mut counts = vec![0usize; n_bins];
        for v in &present {
            let idx = (((v - lo) / width).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == n_bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect();

        Self {
            variable: variable.to_string(),
            bins,
            missing,
        }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Histogram of a named column
pub fn histogram(df: &DataFrame, variable: &str, n_bins: usize) -> Result<Histogram, AnalysisError> {
    let values = column_values(df, variable)?;
    Ok(Histogram::from_values(variable, &values, n_bins))
}
