//! Error types for the cleaning, cohort and regression pipeline.
//!
//! Data-shape problems are detected before any fitting is attempted and
//! carry the column and cohort involved so a failed run can be diagnosed
//! from the message alone.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while preparing data or fitting a model.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// One or more required columns are absent at load time.
    #[error("Dataset is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A column referenced by name does not exist.
    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Filtering left no rows, or no row has both outcome and predictor.
    #[error("cannot fit: empty cohort ({cohort})")]
    EmptyCohort { cohort: String },

    /// Every complete-case row has the same outcome class.
    #[error("cannot fit: no variance in outcome '{outcome}' ({cohort})")]
    NoOutcomeVariance { outcome: String, cohort: String },

    /// Fewer complete cases than model parameters.
    #[error("cannot fit: {rows} complete case(s) for {required} parameters ({cohort})")]
    InsufficientRows {
        rows: usize,
        required: usize,
        cohort: String,
    },

    /// The outcome column holds something other than 0/1.
    #[error("cannot fit: outcome '{outcome}' must be binary 0/1, found value {value}")]
    NonBinaryOutcome { outcome: String, value: f64 },

    /// The predictor separates the outcome classes perfectly.
    #[error("cannot fit: perfect separation on predictor '{predictor}' after {iterations} iteration(s)")]
    PerfectSeparation { predictor: String, iterations: usize },

    /// The information matrix could not be factorized.
    #[error("cannot fit: singular design matrix at iteration {iteration} (is the predictor constant?)")]
    SingularDesign { iteration: usize },

    /// A reference distribution could not be constructed.
    #[error("statistical distribution error: {0}")]
    Distribution(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
