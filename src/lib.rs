//! Protlogit: Cohort Logistic Regression Library
//!
//! Cleans sentinel missing-value codes out of a health survey, derives
//! protein ratio and threshold variables, selects cohorts by weight and
//! blood-pressure status, and fits univariate logistic regressions.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
