//! Univariate logistic analysis of one cohort
//!
//! Ties the cohort filter, descriptive statistics and the logistic fit
//! together and returns a structured [`AnalysisReport`] for the caller to
//! render or export.

use polars::prelude::*;
use serde::Serialize;

use super::cohort::{filter_cohort, CohortSpec};
use super::describe::{describe, histogram, ColumnSummary, Histogram, DEFAULT_HISTOGRAM_BINS};
use super::error::AnalysisError;
use super::loader::{column_values, require_column, BMI};
use super::logit::{fit_logit, LogitConfig, LogitFit, OddsRatio};

/// Rows shown in the cohort preview
pub const PREVIEW_ROWS: usize = 5;

/// Parameters of one analysis call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    /// Binary 0/1 outcome column
    pub outcome: String,
    /// Single continuous predictor column
    pub predictor: String,
    /// Column summarized in the histogram
    pub display_variable: String,
    pub cohort: CohortSpec,
}

impl AnalysisRequest {
    pub fn new(outcome: &str, predictor: &str) -> Self {
        Self {
            outcome: outcome.to_string(),
            predictor: predictor.to_string(),
            display_variable: BMI.to_string(),
            cohort: CohortSpec::default(),
        }
    }

    pub fn with_display_variable(mut self, variable: &str) -> Self {
        self.display_variable = variable.to_string();
        self
    }

    pub fn with_cohort(mut self, cohort: CohortSpec) -> Self {
        self.cohort = cohort;
        self
    }
}

/// A point on the fitted-probability curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub predictor: f64,
    pub probability: f64,
}

/// Everything one analysis call produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    /// First rows of the cohort
    #[serde(skip)]
    pub preview: DataFrame,
    pub cohort_rows: usize,
    /// Rows with both outcome and predictor present
    pub complete_cases: usize,
    /// Cohort rows dropped for a missing outcome or predictor
    pub excluded_rows: usize,
    pub descriptive: Vec<ColumnSummary>,
    pub histogram: Histogram,
    pub fit: LogitFit,
    pub odds_ratios: Vec<OddsRatio>,
    /// One point per complete case, ascending by predictor
    pub curve: Vec<CurvePoint>,
}

/// Rows where both outcome and predictor are present
pub fn complete_cases(outcome: &[Option<f64>], predictor: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    outcome
        .iter()
        .zip(predictor)
        .filter_map(|(y, x)| Some(((*y)?, (*x)?)))
        .unzip()
}

/// Reject outcomes that are not 0/1 or that have a single class
fn check_outcome(y: &[f64], outcome: &str, cohort: &CohortSpec) -> Result<(), AnalysisError> {
    if let Some(&value) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        return Err(AnalysisError::NonBinaryOutcome {
            outcome: outcome.to_string(),
            value,
        });
    }

    let events = y.iter().filter(|&&v| v == 1.0).count();
    if events == 0 || events == y.len() {
        return Err(AnalysisError::NoOutcomeVariance {
            outcome: outcome.to_string(),
            cohort: cohort.to_string(),
        });
    }

    Ok(())
}

/// Filter the cohort, summarize it and fit `outcome ~ 1 + predictor`.
pub fn run_analysis(
    df: &DataFrame,
    request: &AnalysisRequest,
    config: &LogitConfig,
) -> Result<AnalysisReport, AnalysisError> {
    for name in [&request.outcome, &request.predictor, &request.display_variable] {
        require_column(df, name)?;
    }

    let cohort = filter_cohort(df, &request.cohort)?;
    if cohort.height() == 0 {
        return Err(AnalysisError::EmptyCohort {
            cohort: request.cohort.to_string(),
        });
    }

    let preview = cohort.head(Some(PREVIEW_ROWS));
    let descriptive = describe(&cohort)?;
    let histogram = histogram(&cohort, &request.display_variable, DEFAULT_HISTOGRAM_BINS)?;

    let (y, x) = complete_cases(
        &column_values(&cohort, &request.outcome)?,
        &column_values(&cohort, &request.predictor)?,
    );
    let excluded_rows = cohort.height() - y.len();
    log::info!(
        "Complete cases for {} ~ {}: {} ({} excluded)",
        request.outcome,
        request.predictor,
        y.len(),
        excluded_rows
    );

    const PARAMETERS: usize = 2;
    if y.is_empty() {
        return Err(AnalysisError::EmptyCohort {
            cohort: request.cohort.to_string(),
        });
    }
    if y.len() < PARAMETERS {
        return Err(AnalysisError::InsufficientRows {
            rows: y.len(),
            required: PARAMETERS,
            cohort: request.cohort.to_string(),
        });
    }
    check_outcome(&y, &request.outcome, &request.cohort)?;

    let fit = fit_logit(&y, &[(request.predictor.as_str(), &x[..])], config)?;
    let odds_ratios = fit.odds_ratios();

    let mut curve: Vec<CurvePoint> = x
        .iter()
        .zip(&fit.fitted)
        .map(|(&predictor, &probability)| CurvePoint {
            predictor,
            probability,
        })
        .collect();
    curve.sort_by(|a, b| {
        a.predictor
            .partial_cmp(&b.predictor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(AnalysisReport {
        request: request.clone(),
        preview,
        cohort_rows: cohort.height(),
        complete_cases: y.len(),
        excluded_rows,
        descriptive,
        histogram,
        fit,
        odds_ratios,
        curve,
    })
}
