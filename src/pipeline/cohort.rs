//! Cohort selection by weight status and blood-pressure status
//!
//! Filters narrow sequentially: the weight filter runs first and the
//! blood-pressure filter is applied to its result. A row whose predicate
//! evaluates to null (missing input) is dropped.

use polars::prelude::*;
use serde::Serialize;

use super::derive::{HIGH_DIASTOLIC, HIGH_SYSTOLIC, OVERWEIGHT_BMI};
use super::error::AnalysisError;
use super::loader::{require_column, BMI, DIASTOLIC_BP, SYSTOLIC_BP};

/// Which subjects to keep by BMI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightStatus {
    /// bmi <= 25
    NonOverweight,
    /// bmi > 25
    Overweight,
    #[default]
    All,
}

impl std::fmt::Display for WeightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightStatus::NonOverweight => write!(f, "non-overweight"),
            WeightStatus::Overweight => write!(f, "overweight"),
            WeightStatus::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for WeightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "non-overweight" | "0" => Ok(WeightStatus::NonOverweight),
            "overweight" | "1" => Ok(WeightStatus::Overweight),
            "all" | "2" => Ok(WeightStatus::All),
            _ => Err(format!(
                "Unknown weight status: '{}'. Use 'non-overweight', 'overweight' or 'all'.",
                s
            )),
        }
    }
}

/// Which subjects to keep by blood pressure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BloodPressureStatus {
    /// sbp <= 140 AND dbp <= 90
    Normal,
    /// sbp > 140 OR dbp > 90
    High,
    #[default]
    All,
}

impl std::fmt::Display for BloodPressureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BloodPressureStatus::Normal => write!(f, "normal"),
            BloodPressureStatus::High => write!(f, "high"),
            BloodPressureStatus::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for BloodPressureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "0" => Ok(BloodPressureStatus::Normal),
            "high" | "1" => Ok(BloodPressureStatus::High),
            "all" | "2" => Ok(BloodPressureStatus::All),
            _ => Err(format!(
                "Unknown blood pressure status: '{}'. Use 'normal', 'high' or 'all'.",
                s
            )),
        }
    }
}

/// The pair of selectors defining one analysis cohort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CohortSpec {
    pub weight: WeightStatus,
    pub blood_pressure: BloodPressureStatus,
}

impl CohortSpec {
    pub fn new(weight: WeightStatus, blood_pressure: BloodPressureStatus) -> Self {
        Self {
            weight,
            blood_pressure,
        }
    }
}

impl std::fmt::Display for CohortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "weight={}, bp={}", self.weight, self.blood_pressure)
    }
}

fn weight_predicate(status: WeightStatus) -> Option<Expr> {
    match status {
        WeightStatus::NonOverweight => Some(col(BMI).lt_eq(lit(OVERWEIGHT_BMI))),
        WeightStatus::Overweight => Some(col(BMI).gt(lit(OVERWEIGHT_BMI))),
        WeightStatus::All => None,
    }
}

// Normal uses AND with inclusive bounds while High (and the hbp flag) use
// OR with strict bounds. Both are kept as-is; see DESIGN.md.
fn blood_pressure_predicate(status: BloodPressureStatus) -> Option<Expr> {
    match status {
        BloodPressureStatus::Normal => Some(
            col(SYSTOLIC_BP)
                .lt_eq(lit(HIGH_SYSTOLIC))
                .and(col(DIASTOLIC_BP).lt_eq(lit(HIGH_DIASTOLIC))),
        ),
        BloodPressureStatus::High => Some(
            col(SYSTOLIC_BP)
                .gt(lit(HIGH_SYSTOLIC))
                .or(col(DIASTOLIC_BP).gt(lit(HIGH_DIASTOLIC))),
        ),
        BloodPressureStatus::All => None,
    }
}

fn apply(df: DataFrame, predicate: Option<Expr>) -> Result<DataFrame, AnalysisError> {
    match predicate {
        Some(expr) => Ok(df.lazy().filter(expr).collect()?),
        None => Ok(df),
    }
}

/// Keep the rows matching both selectors, preserving row order
pub fn filter_cohort(df: &DataFrame, spec: &CohortSpec) -> Result<DataFrame, AnalysisError> {
    if spec.weight != WeightStatus::All {
        require_column(df, BMI)?;
    }
    if spec.blood_pressure != BloodPressureStatus::All {
        require_column(df, SYSTOLIC_BP)?;
        require_column(df, DIASTOLIC_BP)?;
    }

    let by_weight = apply(df.clone(), weight_predicate(spec.weight))?;
    let cohort = apply(by_weight, blood_pressure_predicate(spec.blood_pressure))?;

    log::info!(
        "Cohort ({}): {} of {} rows",
        spec,
        cohort.height(),
        df.height()
    );
    Ok(cohort)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp_frame() -> DataFrame {
        df! {
            "bmi" => [Some(24.0f64), Some(26.0), Some(25.0), Some(30.0), None],
            "sbp" => [Some(140.0f64), Some(150.0), Some(120.0), None, Some(160.0)],
            "dbp" => [Some(90.0f64), Some(80.0), Some(95.0), Some(85.0), Some(70.0)],
        }
        .unwrap()
    }

    fn bmi_of(df: &DataFrame) -> Vec<Option<f64>> {
        df.column("bmi").unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("overweight".parse::<WeightStatus>().unwrap(), WeightStatus::Overweight);
        assert_eq!("0".parse::<WeightStatus>().unwrap(), WeightStatus::NonOverweight);
        assert_eq!("HIGH".parse::<BloodPressureStatus>().unwrap(), BloodPressureStatus::High);
        assert_eq!("2".parse::<BloodPressureStatus>().unwrap(), BloodPressureStatus::All);
        assert!("obese".parse::<WeightStatus>().is_err());
    }

    #[test]
    fn test_cohort_display() {
        let spec = CohortSpec::new(WeightStatus::NonOverweight, BloodPressureStatus::Normal);
        assert_eq!(spec.to_string(), "weight=non-overweight, bp=normal");
    }

    #[test]
    fn test_normal_bp_keeps_inclusive_boundary() {
        let spec = CohortSpec::new(WeightStatus::All, BloodPressureStatus::Normal);
        let cohort = filter_cohort(&bp_frame(), &spec).unwrap();
        // Only row 0 (140/90) qualifies; row 3 has missing sbp
        assert_eq!(bmi_of(&cohort), vec![Some(24.0)]);
    }

    #[test]
    fn test_high_bp_with_missing_operand() {
        let spec = CohortSpec::new(WeightStatus::All, BloodPressureStatus::High);
        let cohort = filter_cohort(&bp_frame(), &spec).unwrap();
        // 150/80, 120/95 and 160/70 are high; missing sbp with dbp 85 is not
        assert_eq!(bmi_of(&cohort), vec![Some(26.0), Some(25.0), None]);
    }

    #[test]
    fn test_non_overweight_boundary() {
        let spec = CohortSpec::new(WeightStatus::NonOverweight, BloodPressureStatus::All);
        let cohort = filter_cohort(&bp_frame(), &spec).unwrap();
        assert_eq!(bmi_of(&cohort), vec![Some(24.0), Some(25.0)]);
    }

    #[test]
    fn test_all_all_is_identity() {
        let df = bp_frame();
        let cohort = filter_cohort(&df, &CohortSpec::default()).unwrap();
        assert!(cohort.equals_missing(&df));
    }

    #[test]
    fn test_filter_requires_bmi() {
        let df = df! { "sbp" => [120.0f64] }.unwrap();
        let spec = CohortSpec::new(WeightStatus::Overweight, BloodPressureStatus::All);
        assert!(matches!(
            filter_cohort(&df, &spec),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }
}
