//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{AnalysisRequest, BloodPressureStatus, CohortSpec, LogitConfig, WeightStatus};

/// Protlogit - Clean a protein intake survey and fit a univariate logistic model on a cohort
#[derive(Parser, Debug)]
#[command(name = "protlogit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Binary outcome column, e.g. "overweight", "crp_cate" or "hbp"
    #[arg(long)]
    pub outcome: String,

    /// Predictor column, e.g. "vptp_ratio", "aptp_ratio", "CRP", "sbp", "dbp" or "bmi"
    #[arg(long)]
    pub predictor: String,

    /// Variable shown in the histogram
    #[arg(long, default_value = "bmi")]
    pub display_var: String,

    /// Weight cohort: "non-overweight" (bmi <= 25), "overweight" (bmi > 25) or "all".
    /// The numeric codes 0, 1 and 2 are accepted too.
    #[arg(long, default_value = "all")]
    pub weight_status: WeightStatus,

    /// Blood pressure cohort: "normal" (sbp <= 140 and dbp <= 90),
    /// "high" (sbp > 140 or dbp > 90) or "all". The numeric codes 0, 1 and 2 are accepted too.
    #[arg(long, default_value = "all")]
    pub bp_status: BloodPressureStatus,

    /// Maximum Newton iterations for the logistic fit
    #[arg(long, default_value = "35")]
    pub max_iterations: usize,

    /// Convergence tolerance on the largest coefficient change
    #[arg(long, default_value = "1e-8", value_parser = validate_tolerance)]
    pub tolerance: f64,

    /// Write the full analysis report as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Save the cleaned dataset with derived columns (CSV or Parquet, by extension)
    #[arg(long)]
    pub save_derived: Option<PathBuf>,

    /// Skip the text histogram and fitted-probability plot
    #[arg(long, default_value = "false")]
    pub no_plots: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// The cohort selected by --weight-status and --bp-status
    pub fn cohort(&self) -> CohortSpec {
        CohortSpec::new(self.weight_status, self.bp_status)
    }

    /// The analysis request described by the arguments
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest::new(&self.outcome, &self.predictor)
            .with_display_variable(&self.display_var)
            .with_cohort(self.cohort())
    }

    /// Solver settings, keeping the default step-halving budget
    pub fn logit_config(&self) -> LogitConfig {
        LogitConfig {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            ..LogitConfig::default()
        }
    }
}

/// Validator for tolerance parameter
fn validate_tolerance(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("tolerance must be between 0.0 and 1.0 (exclusive), got {}", value))
    }
}
