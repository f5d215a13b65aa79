//! Shannon probability and expected gain, derived from running or
//! windowed marginal-return statistics.

use crate::marginal_returns::WindowBuffer;
use serde::{Deserialize, Serialize};

/// Per-observation output of [`GainEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSample {
    /// Shannon probability of an up-move, `(avg/rms + 1) / 2`.
    pub p: f64,
    /// Expected multiplicative per-period gain.
    pub g: f64,
    pub avg: f64,
    pub rms: f64,
    pub count: u64,
}

/// `G = (1 + rms)^P · (1 - rms)^(1-P)`, with `rms == 0` treated as a
/// neutral `G = 1`.
pub fn gain_from_p_rms(p: f64, rms: f64) -> f64 {
    if rms == 0.0 {
        return 1.0;
    }
    (1.0 + rms).powf(p) * (1.0 - rms).powf(1.0 - p)
}

/// Shannon probability from avg/rms, with the `rms == 0` neutral guard.
pub fn shannon_probability(avg: f64, rms: f64) -> f64 {
    if rms == 0.0 {
        return 0.5;
    }
    (avg / rms + 1.0) / 2.0
}

/// Maintains running `Σr`, `Σr²` and a sample counter, emitting one
/// [`GainSample`] per observed marginal return in cumulative mode, or
/// switches to a fixed-size sliding window via [`GainEstimator::windowed`].
pub struct GainEstimator {
    sum_r: f64,
    sum_r2: f64,
    count: u64,
    window: Option<Windowed>,
}

struct Windowed {
    returns: WindowBuffer<f64>,
    squares: WindowBuffer<f64>,
    sum_r: f64,
    sum_r2: f64,
}

impl GainEstimator {
    /// A cumulative estimator over the whole observed history.
    pub fn cumulative() -> Self {
        Self {
            sum_r: 0.0,
            sum_r2: 0.0,
            count: 0,
            window: None,
        }
    }

    /// A windowed estimator holding the last `w` marginal returns.
    pub fn windowed(w: usize) -> Self {
        Self {
            sum_r: 0.0,
            sum_r2: 0.0,
            count: 0,
            window: Some(Windowed {
                returns: WindowBuffer::new(w),
                squares: WindowBuffer::new(w),
                sum_r: 0.0,
                sum_r2: 0.0,
            }),
        }
    }

    /// Feed one marginal return, producing a sample unless this is a
    /// windowed estimator still filling its window (no output for the
    /// first `W + 1` samples: `W` to fill the buffer, plus the first push
    /// that has nothing to subtract against yet).
    pub fn observe(&mut self, r: f64) -> Option<GainSample> {
        self.count += 1;
        let emit_args = match &mut self.window {
            None => {
                self.sum_r += r;
                self.sum_r2 += r * r;
                Some((self.sum_r, self.sum_r2, self.count))
            }
            Some(w) => {
                if let Some(evicted) = w.returns.push(r) {
                    w.sum_r -= evicted;
                }
                if let Some(evicted) = w.squares.push(r * r) {
                    w.sum_r2 -= evicted;
                }
                w.sum_r += r;
                w.sum_r2 += r * r;

                if w.returns.is_full() && self.count > w.returns.capacity() as u64 + 1 {
                    Some((w.sum_r, w.sum_r2, w.returns.capacity() as u64))
                } else {
                    None
                }
            }
        };
        emit_args.map(|(sum_r, sum_r2, n)| self.emit(sum_r, sum_r2, n))
    }

    fn emit(&self, sum_r: f64, sum_r2: f64, n: u64) -> GainSample {
        let k = n as f64;
        let avg = sum_r / k;
        let rms = (sum_r2 / k).sqrt();
        let p = shannon_probability(avg, rms);
        let g = gain_from_p_rms(p, rms);
        GainSample {
            p,
            g,
            avg,
            rms,
            count: n,
        }
    }
}
