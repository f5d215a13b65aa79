//! A polymorphic least-squares fit over six variants.
//!
//! Five variants reduce to a closed-form linear regression of a
//! per-variant transformed `y`. The sixth — logistic — is a nonlinear
//! outer loop that alternates a linear regression on the currently-assumed
//! carrying capacity `c` with one of six selectable update rules for `c`,
//! until `|Δc/c|` falls below tolerance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors the engine surfaces to the caller. Never silently replaced with
/// a dummy fit.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("singular design matrix: determinant is zero")]
    Singular,
    #[error("fit cancelled")]
    Cancelled,
}

/// The fitted coefficients for each variant. `Logistic` additionally
/// carries its convergence status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitResult {
    Linear { a: f64, b: f64 },
    Exponential { a: f64, b: f64 },
    SquareRoot { a: f64, b: f64 },
    Square { a: f64, b: f64 },
    Logarithmic { a: f64, b: f64 },
    Logistic {
        a: f64,
        b: f64,
        c: f64,
        iterations: u32,
        converged: bool,
    },
}

/// One of the six closed-form variants (everything but logistic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedFormVariant {
    Linear,
    Exponential,
    SquareRoot,
    Square,
    Logarithmic,
}

/// One of the six logistic carrying-capacity update rules, selected by the
/// `-m METHOD` CLI flag (`0..=5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogisticMethod {
    /// `c <- c + Δb*(c - mean(n))`
    Delta,
    /// `c <- c + mean_i[(resid_i)*(c - n_i)]`
    SumResidual,
    /// regress `(resid_i)*(c - n_i)` on `t_i`, sample at the midpoint `t`.
    RegressionSample,
    /// [`LogisticMethod::SumResidual`] with the update term negated.
    SumResidualNegated,
    /// [`LogisticMethod::RegressionSample`] with the update term negated.
    RegressionSampleNegated,
    /// [`LogisticMethod::Delta`] with the update term negated.
    DeltaNegated,
}

impl LogisticMethod {
    pub fn from_flag(method: u8) -> Option<Self> {
        Some(match method {
            0 => Self::Delta,
            1 => Self::SumResidual,
            2 => Self::RegressionSample,
            3 => Self::SumResidualNegated,
            4 => Self::RegressionSampleNegated,
            5 => Self::DeltaNegated,
            _ => return None,
        })
    }
}

/// Tolerance and iteration options for the logistic outer loop.
pub struct LogisticOptions<'a> {
    pub start_c: f64,
    pub step_c: f64,
    pub method: LogisticMethod,
    pub emit_convergence_trace: bool,
    /// Polled at the top of each outer iteration; returning `true`
    /// surfaces `FitError::Cancelled` immediately.
    pub cancel: Option<&'a dyn Fn() -> bool>,
}

impl Default for LogisticOptions<'_> {
    fn default() -> Self {
        Self {
            start_c: 0.0,
            step_c: 1.1,
            method: LogisticMethod::Delta,
            emit_convergence_trace: false,
            cancel: None,
        }
    }
}

/// Hard cap on the logistic outer loop; non-convergence is surfaced as
/// `FitResult::Logistic { converged: false, .. }` rather than looping
/// indefinitely.
pub const LOGISTIC_MAX_ITERATIONS: u32 = 10_000;

/// Presentation options for [`LeastSquaresEngine::present`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FitOptions {
    pub subtract_fit: bool,
    pub scale_to_fit: bool,
}

/// What a caller asked [`LeastSquaresEngine::present`] to produce.
#[derive(Debug, Clone)]
pub enum FitOutput {
    Formula(String),
    Series(Vec<f64>),
    Residual(Vec<f64>),
}

pub struct LeastSquaresEngine;

impl LeastSquaresEngine {
    /// Fit one of the five closed-form variants. `samples` is `(t, y)`
    /// pairs; callers default `t` to the sample index when it is absent.
    pub fn fit_closed_form(
        samples: &[(f64, f64)],
        variant: ClosedFormVariant,
    ) -> Result<FitResult, FitError> {
        let transformed: Vec<(f64, f64)> = samples
            .iter()
            .map(|&(t, y)| (t, transform_y(variant, y)))
            .collect();
        let (a, b) = linear_regression(&transformed)?;
        Ok(match variant {
            ClosedFormVariant::Linear => FitResult::Linear { a, b },
            ClosedFormVariant::Exponential => FitResult::Exponential { a, b },
            ClosedFormVariant::SquareRoot => FitResult::SquareRoot { a, b },
            ClosedFormVariant::Square => FitResult::Square { a, b },
            ClosedFormVariant::Logarithmic => FitResult::Logarithmic { a, b },
        })
    }

    /// Nonlinear logistic fit: `n(t) = c / (1 + exp(-(b + a*t)))`,
    /// reparameterised as `y_i = ln(n_i / (c - n_i)) = b + a*t_i` for the
    /// true `c`.
    pub fn fit_logistic(
        samples: &[(f64, f64)],
        opts: &LogisticOptions,
    ) -> Result<FitResult, FitError> {
        assert!(!samples.is_empty(), "logistic fit requires samples");

        let max_n = samples
            .iter()
            .map(|&(_, n)| n)
            .fold(f64::MIN, f64::max);
        let mut c = opts.start_c.max(2.0 * max_n);
        let eps = f64::EPSILON * 1000.0;
        let count = samples.len() as f64;
        let mean_n: f64 = samples.iter().map(|&(_, n)| n).sum::<f64>() / count;
        let mid_t = samples[samples.len() / 2].0;

        let mut a = 0.0;
        let mut b = 0.0;
        let mut iterations = 0u32;

        loop {
            if let Some(cancel) = opts.cancel {
                if cancel() {
                    return Err(FitError::Cancelled);
                }
            }
            iterations += 1;
            if iterations > LOGISTIC_MAX_ITERATIONS {
                return Ok(FitResult::Logistic {
                    a,
                    b,
                    c,
                    iterations: iterations - 1,
                    converged: false,
                });
            }

            // (i) inflate c until every log argument stays positive.
            let mut k = 1u32;
            while c <= max_n {
                c = max_n * opts.step_c * k as f64;
                if opts.emit_convergence_trace {
                    eprintln!("lsq: logistic c inflated to {c} (k={k})");
                }
                k += 1;
            }

            // (ii) regression on y_i = ln(n_i / (c - n_i)).
            let transformed: Vec<(f64, f64)> = samples
                .iter()
                .map(|&(t, n)| (t, (n / (c - n)).ln()))
                .collect();
            let (a_new, b_new) = linear_regression(&transformed)?;
            let delta_b = b_new - b;
            a = a_new;
            b = b_new;

            // residual_i = y_i - a*t_i - b, reused by methods 1-4.
            let residual_at = |t: f64, n: f64| -> f64 { (n / (c - n)).ln() - a * t - b };

            let c_old = c;
            let c_new = match opts.method {
                LogisticMethod::Delta => c + delta_b * (c - mean_n),
                LogisticMethod::DeltaNegated => c - delta_b * (c - mean_n),
                LogisticMethod::SumResidual => {
                    let sum: f64 = samples
                        .iter()
                        .map(|&(t, n)| residual_at(t, n) * (c - n))
                        .sum();
                    c + sum / count
                }
                LogisticMethod::SumResidualNegated => {
                    let sum: f64 = samples
                        .iter()
                        .map(|&(t, n)| residual_at(t, n) * (c - n))
                        .sum();
                    c - sum / count
                }
                LogisticMethod::RegressionSample | LogisticMethod::RegressionSampleNegated => {
                    let phi: Vec<(f64, f64)> = samples
                        .iter()
                        .map(|&(t, n)| (t, residual_at(t, n) * (c - n)))
                        .collect();
                    let (alpha, beta) = linear_regression(&phi)?;
                    let sample_value = beta + alpha * mid_t;
                    if opts.method == LogisticMethod::RegressionSample {
                        c + sample_value
                    } else {
                        c - sample_value
                    }
                }
            };

            if opts.emit_convergence_trace {
                eprintln!("lsq: logistic iter {iterations}: c {c_old} -> {c_new}");
            }

            let error = c_old / c_new - 1.0;
            c = c_new;
            if error.abs() <= eps {
                return Ok(FitResult::Logistic {
                    a,
                    b,
                    c,
                    iterations,
                    converged: true,
                });
            }
        }
    }

    /// Turn a fit plus the original samples into a formula string, a
    /// re-evaluated fit series, or a residual series — decoupling numeric
    /// fitting from how a caller wants to display it.
    pub fn present(result: &FitResult, samples: &[(f64, f64)], opts: FitOptions) -> FitOutput {
        if !opts.subtract_fit && !opts.scale_to_fit {
            return FitOutput::Formula(format_formula(result));
        }

        let fitted: Vec<f64> = samples.iter().map(|&(t, _)| result.evaluate(t)).collect();
        if !opts.scale_to_fit && opts.subtract_fit {
            let residual: Vec<f64> = samples
                .iter()
                .zip(&fitted)
                .map(|(&(_, y), &f)| y - f)
                .collect();
            return FitOutput::Residual(residual);
        }

        // scale_to_fit implies subtract_fit, normalised by the fitted value.
        let residual: Vec<f64> = samples
            .iter()
            .zip(&fitted)
            .map(|(&(_, y), &f)| if f != 0.0 { (y - f) / f } else { 0.0 })
            .collect();
        FitOutput::Residual(residual)
    }
}

fn transform_y(variant: ClosedFormVariant, y: f64) -> f64 {
    match variant {
        ClosedFormVariant::Linear => y,
        ClosedFormVariant::Exponential => y.ln(),
        ClosedFormVariant::SquareRoot => y * y,
        ClosedFormVariant::Logarithmic => y.exp(),
        ClosedFormVariant::Square => y.sqrt(),
    }
}

impl FitResult {
    /// Re-evaluate the fitted curve at `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        match *self {
            FitResult::Linear { a, b } => b + a * t,
            FitResult::Exponential { a, b } => (b + a * t).exp(),
            FitResult::SquareRoot { a, b } => (b + a * t).sqrt(),
            FitResult::Logarithmic { a, b } => (b + a * t).ln(),
            FitResult::Square { a, b } => (b + a * t).powi(2),
            FitResult::Logistic { a, b, c, .. } => c / (1.0 + (-(b + a * t)).exp()),
        }
    }
}

fn format_formula(result: &FitResult) -> String {
    match *result {
        FitResult::Linear { a, b } => format!("y = {b} + {a}*t"),
        FitResult::Exponential { a, b } => format!("y = exp({b} + {a}*t)"),
        FitResult::SquareRoot { a, b } => format!("y = sqrt({b} + {a}*t)"),
        FitResult::Logarithmic { a, b } => format!("y = ln({b} + {a}*t)"),
        FitResult::Square { a, b } => format!("y = ({b} + {a}*t)^2"),
        FitResult::Logistic { a, b, c, .. } => format!("y = {c} / (1 + exp(-({b} + {a}*t)))"),
    }
}

/// `Sx, Sy, Sxx, Sxy` over the sample, then the standard closed-form
/// slope/intercept. `det == 0` (e.g. all `t_i` equal) is a genuine
/// structural failure, surfaced as [`FitError::Singular`] rather than
/// dividing by zero.
fn linear_regression(samples: &[(f64, f64)]) -> Result<(f64, f64), FitError> {
    let n = samples.len() as f64;
    let (sx, sy, sxx, sxy) = samples.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, sxy), &(t, y)| (sx + t, sy + y, sxx + t * t, sxy + t * y),
    );
    let det = n * sxx - sx * sx;
    if det == 0.0 {
        return Err(FitError::Singular);
    }
    let a = (n * sxy - sx * sy) / det;
    let b = (sxx * sy - sx * sxy) / det;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_samples() -> Vec<(f64, f64)> {
        (0..100).map(|i| (i as f64, 2.0 + 3.0 * i as f64)).collect()
    }

    #[test]
    fn linear_recovery_scenario_s5() {
        let result = LeastSquaresEngine::fit_closed_form(
            &linear_samples(),
            ClosedFormVariant::Linear,
        )
        .unwrap();
        match result {
            FitResult::Linear { a, b } => {
                assert_relative_eq!(a, 3.0, epsilon = 1e-10);
                assert_relative_eq!(b, 2.0, epsilon = 1e-10);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn linear_fit_is_idempotent() {
        let samples = linear_samples();
        let first =
            LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear).unwrap();
        let second =
            LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_design_matrix_is_singular() {
        let samples = vec![(1.0, 2.0), (1.0, 3.0), (1.0, 4.0)];
        let err =
            LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear).unwrap_err();
        assert_eq!(err, FitError::Singular);
    }

    #[test]
    fn power_reparameterisation_round_trips() {
        let a = 0.05_f64;
        let b = 1.5_f64;
        for t in [0.0, 10.0, 50.0, 99.0] {
            let direct = (b + a * t).exp();
            let power = a.exp().powf(b / a + t);
            assert_relative_eq!(direct, power, max_relative = 1e-12);
        }
    }

    fn logistic_samples() -> Vec<(f64, f64)> {
        (0..=100)
            .map(|i| {
                let t = i as f64;
                (t, 100.0 / (1.0 + (-(0.1 * t - 5.0)).exp()))
            })
            .collect()
    }

    #[test]
    fn logistic_converges_scenario_s6() {
        let samples = logistic_samples();
        let max_n = samples.iter().map(|&(_, n)| n).fold(f64::MIN, f64::max);
        let opts = LogisticOptions {
            start_c: 2.0 * max_n,
            ..Default::default()
        };
        let result = LeastSquaresEngine::fit_logistic(&samples, &opts).unwrap();
        match result {
            FitResult::Logistic {
                a,
                c,
                iterations,
                converged,
                ..
            } => {
                assert!(converged);
                assert!(iterations as usize <= 1000);
                assert!((c - 100.0).abs() / 100.0 < 0.01);
                assert!((a - 0.1).abs() / 0.1 < 0.02);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn all_six_logistic_methods_run_to_completion() {
        let samples = logistic_samples();
        for method in 0..=5u8 {
            let opts = LogisticOptions {
                start_c: 0.0,
                method: LogisticMethod::from_flag(method).unwrap(),
                ..Default::default()
            };
            // Not all methods are guaranteed to converge on this input; the
            // property under test is that the loop terminates with a
            // result rather than looping forever or panicking.
            let result = LeastSquaresEngine::fit_logistic(&samples, &opts);
            assert!(result.is_ok());
        }
    }

    #[test]
    fn logistic_cancellation_is_surfaced() {
        let samples = logistic_samples();
        let cancel = || true;
        let opts = LogisticOptions {
            cancel: Some(&cancel),
            ..Default::default()
        };
        let err = LeastSquaresEngine::fit_logistic(&samples, &opts).unwrap_err();
        assert_eq!(err, FitError::Cancelled);
    }

    #[test]
    fn present_formula_only_by_default() {
        let result = FitResult::Linear { a: 1.0, b: 0.0 };
        match LeastSquaresEngine::present(&result, &[(0.0, 0.0)], FitOptions::default()) {
            FitOutput::Formula(s) => assert!(s.contains("y =")),
            other => panic!("expected formula, got {other:?}"),
        }
    }

    #[test]
    fn present_residual_subtracts_fit() {
        let result = FitResult::Linear { a: 1.0, b: 0.0 };
        let samples = [(0.0, 0.0), (1.0, 1.5)];
        let opts = FitOptions {
            subtract_fit: true,
            scale_to_fit: false,
        };
        match LeastSquaresEngine::present(&result, &samples, opts) {
            FitOutput::Residual(r) => {
                assert_relative_eq!(r[0], 0.0);
                assert_relative_eq!(r[1], 0.5);
            }
            other => panic!("expected residual, got {other:?}"),
        }
    }
}
