//! Binary logistic regression fitted by Newton-Raphson (IRLS)
//!
//! The design matrix is an intercept column followed by one column per
//! predictor. Each iteration solves the normal equations
//! `(X'WX) delta = X'(y - mu)` through a Cholesky factorization, with
//! step halving whenever the log-likelihood would decrease.

use faer::{prelude::SolverCore, Mat, Side};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use super::error::AnalysisError;

/// Name reported for the constant term
pub const INTERCEPT: &str = "intercept";

/// Two-sided confidence level for coefficient intervals
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Solver settings
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LogitConfig {
    /// Newton iterations before giving up (default 35)
    pub max_iterations: usize,
    /// Convergence threshold on the largest coefficient change
    pub tolerance: f64,
    /// Step halvings allowed per iteration
    pub max_step_halvings: usize,
}

impl Default for LogitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 35,
            tolerance: 1e-8,
            max_step_halvings: 30,
        }
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    /// Lower 95% bound on the log-odds scale
    pub ci_lower: f64,
    /// Upper 95% bound on the log-odds scale
    pub ci_upper: f64,
}

/// A coefficient and its interval moved to the odds scale
#[derive(Debug, Clone, Serialize)]
pub struct OddsRatio {
    pub name: String,
    pub odds_ratio: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl Coefficient {
    pub fn odds_ratio(&self) -> OddsRatio {
        OddsRatio {
            name: self.name.clone(),
            odds_ratio: self.estimate.exp(),
            ci_lower: self.ci_lower.exp(),
            ci_upper: self.ci_upper.exp(),
        }
    }
}

/// Result of a logistic fit
#[derive(Debug, Clone, Serialize)]
pub struct LogitFit {
    /// Intercept first, then predictors in input order
    pub coefficients: Vec<Coefficient>,
    /// Fitted P(outcome = 1) per input row
    #[serde(skip)]
    pub fitted: Vec<f64>,
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub log_likelihood: f64,
    pub ll_null: f64,
    /// McFadden's pseudo R-squared
    pub pseudo_r_squared: f64,
    /// Likelihood-ratio test against the intercept-only model
    pub llr_p_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogitFit {
    pub fn params(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    pub fn odds_ratios(&self) -> Vec<OddsRatio> {
        self.coefficients.iter().map(Coefficient::odds_ratio).collect()
    }

    /// P(outcome = 1) for one row of predictor values (intercept implied)
    pub fn predict(&self, predictors: &[f64]) -> f64 {
        let mut eta = self.coefficients.first().map_or(0.0, |c| c.estimate);
        for (c, x) in self.coefficients.iter().skip(1).zip(predictors) {
            eta += c.estimate * x;
        }
        sigmoid(eta)
    }
}

/// Logistic function, stable for large |eta|
pub fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^x) without overflow
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

fn log_likelihood(y: &[f64], eta: &[f64]) -> f64 {
    y.iter().zip(eta).map(|(&y, &e)| y * e - softplus(e)).sum()
}

fn linear_predictor(x: &Mat<f64>, beta: &[f64]) -> Vec<f64> {
    (0..x.nrows())
        .map(|i| (0..x.ncols()).map(|j| x[(i, j)] * beta[j]).sum::<f64>())
        .collect()
}

// Fitted values indistinguishable from the observed classes
fn perfectly_predicted(y: &[f64], eta: &[f64]) -> bool {
    y.iter()
        .zip(eta)
        .all(|(&y, &e)| (sigmoid(e) - y).abs() <= 1e-8 + 1e-5 * y.abs())
}

/// Inverse of the information matrix X'WX at `mu`
fn information_inverse(x: &Mat<f64>, mu: &[f64], iteration: usize) -> Result<Mat<f64>, AnalysisError> {
    let wx = Mat::<f64>::from_fn(x.nrows(), x.ncols(), |i, j| mu[i] * (1.0 - mu[i]) * x[(i, j)]);
    let information = x.transpose() * &wx;

    let cholesky = information
        .cholesky(Side::Lower)
        .map_err(|_| AnalysisError::SingularDesign { iteration })?;
    Ok(cholesky.inverse())
}

fn score(x: &Mat<f64>, y: &[f64], mu: &[f64]) -> Vec<f64> {
    (0..x.ncols())
        .map(|j| (0..x.nrows()).map(|i| x[(i, j)] * (y[i] - mu[i])).sum::<f64>())
        .collect()
}

/// Log-likelihood of the intercept-only model
fn null_log_likelihood(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let events: f64 = y.iter().sum();
    let rate = events / n;
    let xlogy = |a: f64, b: f64| if a == 0.0 { 0.0 } else { a * b.ln() };
    xlogy(events, rate) + xlogy(n - events, 1.0 - rate)
}

/// Fit `outcome ~ 1 + predictors`.
///
/// `outcome` must hold 0/1 values and every predictor slice must have the
/// same length; callers are expected to have removed incomplete rows.
///
/// Perfect separation is reported as an error. Running out of iterations is
/// not: the last estimate is returned with `converged = false`.
pub fn fit_logit(
    outcome: &[f64],
    predictors: &[(&str, &[f64])],
    config: &LogitConfig,
) -> Result<LogitFit, AnalysisError> {
    let n = outcome.len();
    let k = predictors.len() + 1;
    let predictor_names = predictors
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");

    let x = Mat::<f64>::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { predictors[j - 1].1[i] });

    let mut beta = vec![0.0; k];
    let mut eta = linear_predictor(&x, &beta);
    let mut ll = log_likelihood(outcome, &eta);
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=config.max_iterations {
        iterations = iter;

        let mu: Vec<f64> = eta.iter().map(|&e| sigmoid(e)).collect();
        let covariance = information_inverse(&x, &mu, iter)?;
        let grad = score(&x, outcome, &mu);
        let step: Vec<f64> = (0..k)
            .map(|r| (0..k).map(|c| covariance[(r, c)] * grad[c]).sum::<f64>())
            .collect();

        if !step.iter().all(|s| s.is_finite()) {
            log::error!("Non-finite Newton step at iteration {iter}: {step:?}");
            return Err(AnalysisError::PerfectSeparation {
                predictor: predictor_names,
                iterations: iter,
            });
        }

        let mut scale = 1.0;
        let mut beta_trial: Vec<f64> = beta.iter().zip(&step).map(|(b, s)| b + s).collect();
        let mut eta_trial = linear_predictor(&x, &beta_trial);
        let mut ll_trial = log_likelihood(outcome, &eta_trial);

        let mut halvings = 0;
        while (!ll_trial.is_finite() || ll_trial < ll - 1e-12 * (1.0 + ll.abs()))
            && halvings < config.max_step_halvings
        {
            scale *= 0.5;
            beta_trial = beta.iter().zip(&step).map(|(b, s)| b + scale * s).collect();
            eta_trial = linear_predictor(&x, &beta_trial);
            ll_trial = log_likelihood(outcome, &eta_trial);
            halvings += 1;
        }

        if !ll_trial.is_finite() {
            log::warn!("Newton step failed after {halvings} halvings at iteration {iter}");
            break;
        }
        if halvings > 0 {
            log::debug!("Step halving successful after {halvings} attempts");
        }

        let change = beta
            .iter()
            .zip(&beta_trial)
            .map(|(old, new)| (new - old).abs())
            .fold(0.0, f64::max);

        beta = beta_trial;
        eta = eta_trial;
        ll = ll_trial;

        log::debug!(
            "Newton iteration #{iter}: log-likelihood {:.8}, max change {:.3e}, beta {:?}",
            ll,
            change,
            beta
        );

        if perfectly_predicted(outcome, &eta) {
            return Err(AnalysisError::PerfectSeparation {
                predictor: predictor_names,
                iterations: iter,
            });
        }

        if change < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        log::warn!(
            "Logistic fit did not converge after {} iteration(s); estimates may be unreliable",
            iterations
        );
    }

    let fitted: Vec<f64> = eta.iter().map(|&e| sigmoid(e)).collect();
    let covariance = information_inverse(&x, &fitted, iterations)?;

    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    let z_crit = normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0);

    let names: Vec<&str> = std::iter::once(INTERCEPT)
        .chain(predictors.iter().map(|(name, _)| *name))
        .collect();

    let coefficients = names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let std_error = covariance[(j, j)].sqrt();
            let z_value = estimate / std_error;
            Coefficient {
                name: name.to_string(),
                estimate,
                std_error,
                z_value,
                p_value: 2.0 * normal.cdf(-z_value.abs()),
                ci_lower: estimate - z_crit * std_error,
                ci_upper: estimate + z_crit * std_error,
            }
        })
        .collect();

    let ll_null = null_log_likelihood(outcome);
    let df_model = k - 1;
    let llr = 2.0 * (ll - ll_null);
    let llr_p_value = if df_model == 0 {
        1.0
    } else {
        let chi2 = ChiSquared::new(df_model as f64)
            .map_err(|e| AnalysisError::Distribution(e.to_string()))?;
        1.0 - chi2.cdf(llr.max(0.0))
    };

    Ok(LogitFit {
        coefficients,
        fitted,
        n_obs: n,
        df_model,
        df_resid: n.saturating_sub(k),
        log_likelihood: ll,
        ll_null,
        pseudo_r_squared: if ll_null != 0.0 { 1.0 - ll / ll_null } else { 0.0 },
        llr_p_value,
        iterations,
        converged,
    })
}
