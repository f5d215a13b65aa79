//! Confidence-compensated Shannon probability.
//!
//! Three estimators share one bisection skeleton over [`NormalTable`]
//! indices. Each supplies a steering residual `D(m)` whose sign selects the
//! next half-interval; the index at termination yields the confidence
//! factor `c = Φ(index / STEPS_PER_SIGMA)`.

use serde::{Deserialize, Serialize};

use crate::normal_table::{NormalTable, STEPS_PER_SIGMA};

/// Which confidence estimator produced a [`ConfidenceEstimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceVariant {
    ByRms,
    ByAvg,
    ByAvgRms,
}

/// Output of a [`ConfidenceSolver`] run.
///
/// On any numerical guard triggering, every probability field is filled
/// with the fallback (`P = 0.5`, `P_eff = 0.25`, `P_conf = 0.5`) while
/// `avg`/`rms` are preserved unchanged — the guard never fabricates
/// statistics, only confidence about them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEstimate {
    pub p: f64,
    pub p_eff: f64,
    /// The solved confidence factor `c` itself, as opposed to `p_eff`
    /// which is `p` already discounted by it.
    pub p_conf: f64,
    pub avg: f64,
    pub rms: f64,
    pub count: u64,
    pub variant: ConfidenceVariant,
}

impl ConfidenceEstimate {
    fn fallback(avg: f64, rms: f64, count: u64, variant: ConfidenceVariant) -> Self {
        Self {
            p: 0.5,
            p_eff: 0.25,
            p_conf: 0.5,
            avg,
            rms,
            count,
            variant,
        }
    }
}

/// Runs the shared bisection skeleton: `bottom = 0, top = top0`, narrowing
/// until `top <= bottom`, returning the index of the last visited `mid`.
/// Fixed worst-case iterations `<= ceil(log2(top0 + 1)) + 1`.
fn bisect(top0: i64, residual: impl Fn(usize) -> f64) -> usize {
    if top0 < 0 {
        return 0;
    }
    let mut bottom: i64 = 0;
    let mut top: i64 = top0;
    let mut last_mid = bottom;
    while top > bottom {
        let mid = (bottom + top) / 2;
        last_mid = mid;
        if residual(mid as usize) < 0.0 {
            top = mid - 1;
        } else {
            bottom = mid + 1;
        }
    }
    last_mid.clamp(0, top0) as usize
}

pub struct ConfidenceSolver;

impl ConfidenceSolver {
    /// `P = (rms + 1) / 2`. No additional guards: `rms` may be zero, the
    /// solver still terminates and the fallback is never needed here.
    pub fn by_rms(rms: f64, n: u64) -> ConfidenceEstimate {
        let table = NormalTable::global();
        let l = table.len();
        let p = (rms + 1.0) / 2.0;
        let steps = STEPS_PER_SIGMA as f64;
        let n_f = n as f64;

        let residual = |m: usize| -> f64 {
            let phi_m = table.index(m);
            rms - (rms / (2.0 * n_f).sqrt()) * (m as f64 / steps) + 1.0 - (rms + 1.0) * phi_m
        };

        let idx = bisect(l as i64 - 1, residual);
        let c = table.index(idx);
        ConfidenceEstimate {
            p,
            p_eff: p * c,
            p_conf: c,
            avg: f64::NAN,
            rms,
            count: n,
            variant: ConfidenceVariant::ByRms,
        }
    }

    /// `P = (sqrt(avg) + 1) / 2`. Requires `avg >= 0` and `rms > 0`, and a
    /// non-empty bisection range (equivalently `avg` large enough relative
    /// to `rms` that the radical `avg - scale1 * x` stays real over at
    /// least the first step) — otherwise the fallback is returned.
    pub fn by_avg(avg: f64, rms: f64, n: u64) -> ConfidenceEstimate {
        if avg < 0.0 || rms <= 0.0 {
            return ConfidenceEstimate::fallback(avg, rms, n, ConfidenceVariant::ByAvg);
        }

        let table = NormalTable::global();
        let l = table.len();
        let p = (avg.sqrt() + 1.0) / 2.0;
        let steps = STEPS_PER_SIGMA as f64;
        let n_f = n as f64;

        let scale1 = rms / n_f.sqrt();
        let scale2 = avg.sqrt() + 1.0;
        let top_cap = ((avg / scale1) * steps).floor() - 1.0;
        if top_cap < 0.0 {
            return ConfidenceEstimate::fallback(avg, rms, n, ConfidenceVariant::ByAvg);
        }
        let top = (top_cap as i64).min(l as i64 - 1);

        let residual = |m: usize| -> f64 {
            let phi_m = table.index(m);
            let radicand = avg - scale1 * (m as f64 / steps);
            let radicand = radicand.max(0.0);
            radicand.sqrt() + 1.0 - scale2 * phi_m
        };

        let idx = bisect(top, residual);
        let c = table.index(idx);
        ConfidenceEstimate {
            p,
            p_eff: p * c,
            p_conf: c,
            avg,
            rms,
            count: n,
            variant: ConfidenceVariant::ByAvg,
        }
    }

    /// `P = (avg/rms + 1) / 2`. Two independent bisections — `cr` for the
    /// rms-error confidence, `ca` for the avg-error confidence — whose
    /// product is the overall confidence. Requires `rms > 0`.
    pub fn by_avg_and_rms(avg: f64, rms: f64, n: u64) -> ConfidenceEstimate {
        if rms <= 0.0 {
            return ConfidenceEstimate::fallback(avg, rms, n, ConfidenceVariant::ByAvgRms);
        }

        let table = NormalTable::global();
        let l = table.len();
        let p = (avg / rms + 1.0) / 2.0;
        let steps = STEPS_PER_SIGMA as f64;
        let n_f = n as f64;
        let scale2 = avg / rms + 1.0;

        // Pass 1: cr.
        let scale1_cr = rms / (2.0 * n_f).sqrt();
        let residual_cr = |m: usize| -> f64 {
            let phi_m = table.index(m);
            avg / (rms + scale1_cr * (m as f64 / steps)) + 1.0 - scale2 * phi_m
        };
        let idx_cr = bisect(l as i64 - 1, residual_cr);
        let cr = table.index(idx_cr);

        // Pass 2: ca, independent bisection over the same range.
        let scale1_ca = rms / n_f.sqrt();
        let residual_ca = |m: usize| -> f64 {
            let phi_m = table.index(m);
            (avg - scale1_ca * (m as f64 / steps)) / rms + 1.0 - scale2 * phi_m
        };
        let idx_ca = bisect(l as i64 - 1, residual_ca);
        let ca = table.index(idx_ca);

        let c = ca * cr;
        ConfidenceEstimate {
            p,
            p_eff: p * c,
            p_conf: c,
            avg,
            rms,
            count: n,
            variant: ConfidenceVariant::ByAvgRms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn by_rms_scenario_s2() {
        let est = ConfidenceSolver::by_rms(0.02, 100);
        assert!(approx_eq!(f64, est.p, 0.51, epsilon = 1e-3));
        assert!(approx_eq!(f64, est.p_conf, 0.9963, epsilon = 1e-3));
        assert!(approx_eq!(f64, est.p_eff, 0.50811, epsilon = 1e-3));
    }

    #[test]
    fn by_rms_scenario_s3_low_n() {
        let est = ConfidenceSolver::by_rms(0.2, 10);
        assert!(approx_eq!(f64, est.p, 0.6, epsilon = 1e-3));
        assert!(approx_eq!(f64, est.p_conf, 0.9416, epsilon = 1e-3));
    }

    #[test]
    fn by_avg_scenario_s4() {
        let est = ConfidenceSolver::by_avg(0.0016, 0.04, 10_000);
        assert!(approx_eq!(f64, est.p, 0.52, epsilon = 1e-3));
        assert!(approx_eq!(f64, est.p_conf, 0.9871, epsilon = 1e-3));
    }

    #[test]
    fn by_avg_guards_negative_avg() {
        let est = ConfidenceSolver::by_avg(-0.1, 0.05, 100);
        assert_eq!(est.p, 0.5);
        assert_eq!(est.p_eff, 0.25);
        assert_eq!(est.avg, -0.1);
    }

    #[test]
    fn by_avg_guards_zero_rms() {
        let est = ConfidenceSolver::by_avg(0.01, 0.0, 100);
        assert_eq!(est.p, 0.5);
        assert_eq!(est.p_eff, 0.25);
    }

    #[test]
    fn by_avg_rms_guards_zero_rms() {
        let est = ConfidenceSolver::by_avg_and_rms(0.01, 0.0, 100);
        assert_eq!(est.p, 0.5);
        assert_eq!(est.p_eff, 0.25);
    }

    #[test]
    fn peff_never_exceeds_p() {
        for (avg, rms, n) in [(0.02, 0.2, 50), (0.0, 0.1, 400), (-0.01, 0.1, 40)] {
            let rms_est = ConfidenceSolver::by_rms(rms, n);
            assert!(rms_est.p_eff <= rms_est.p + 1e-12);
            assert!(rms_est.p_eff >= 0.0);

            let avg_est = ConfidenceSolver::by_avg(avg, rms, n);
            assert!(avg_est.p_eff <= avg_est.p + 1e-12);

            let avgrms_est = ConfidenceSolver::by_avg_and_rms(avg, rms, n);
            assert!(avgrms_est.p_eff <= avgrms_est.p + 1e-12 || avgrms_est.p_eff == 0.25);
        }
    }

    #[test]
    fn constant_series_falls_back_exactly() {
        // rms == 0 forces the ByAvg/ByAvgRms fallback; ByRms degenerates
        // to P == 0.5 without needing the guard.
        let by_rms = ConfidenceSolver::by_rms(0.0, 100);
        assert_eq!(by_rms.p, 0.5);

        let by_avg = ConfidenceSolver::by_avg(0.0, 0.0, 100);
        assert_eq!(by_avg.p, 0.5);
        assert_eq!(by_avg.p_eff, 0.25);

        let by_avg_rms = ConfidenceSolver::by_avg_and_rms(0.0, 0.0, 100);
        assert_eq!(by_avg_rms.p, 0.5);
        assert_eq!(by_avg_rms.p_eff, 0.25);
    }

    #[test]
    fn bisection_iteration_count_bounded() {
        use crate::normal_table::TABLE_LEN;
        use std::cell::Cell;
        let evaluations = Cell::new(0usize);
        let _ = bisect(TABLE_LEN as i64 - 1, |_m| {
            evaluations.set(evaluations.get() + 1);
            0.0
        });
        let bound = (TABLE_LEN as f64).log2().ceil() as usize + 1;
        assert!(evaluations.get() <= bound);
    }
}
