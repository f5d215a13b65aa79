//! Tabulated standard normal CDF, the one piece of process-wide shared
//! state in this crate.
//!
//! Built once, on first use, by a forward-difference rectangle sum of the
//! density stacked on top of the 0.5 mass below zero. Not adaptive —
//! precision is entirely a function of [`STEPS_PER_SIGMA`].

use std::sync::OnceLock;

/// Range of the table, in standard deviations.
pub const SIGMAS: usize = 3;

/// Table resolution: samples per standard deviation.
pub const STEPS_PER_SIGMA: usize = 1000;

/// Total number of entries in the table.
pub const TABLE_LEN: usize = SIGMAS * STEPS_PER_SIGMA;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

static TABLE: OnceLock<NormalTable> = OnceLock::new();

/// An immutable, monotonically increasing sampling of `Φ(x)` for
/// `x ∈ [0, SIGMAS]`, indexed at `1 / STEPS_PER_SIGMA` resolution.
#[derive(Debug)]
pub struct NormalTable {
    values: Vec<f64>,
}

impl NormalTable {
    fn build() -> Self {
        let steps_per_sigma = STEPS_PER_SIGMA as f64;
        let delta = 1.0 / steps_per_sigma;
        let mut values = Vec::with_capacity(TABLE_LEN);
        let mut s = 0.5;
        let mut x: f64 = 0.0;
        for _ in 0..TABLE_LEN {
            values.push(s);
            s += INV_SQRT_2PI * (-x * x / 2.0).exp() * delta;
            x += delta;
        }
        Self { values }
    }

    /// The process-wide table, built on first call and read-only after.
    /// `OnceLock` gives publication-safe one-time initialisation: any
    /// thread racing to build it observes either its own completed build
    /// or the winner's, never a partial one.
    pub fn global() -> &'static NormalTable {
        TABLE.get_or_init(Self::build)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw indexed access, used by the bisection solvers.
    pub fn index(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// `Φ(sigma)`, clamped to `1.0` once `sigma` runs past the table range.
    pub fn value_at(&self, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return self.values[0];
        }
        let idx = (sigma * STEPS_PER_SIGMA as f64).floor();
        if idx >= self.values.len() as f64 {
            1.0
        } else {
            self.values[idx as usize]
        }
    }

    /// `erf(n) = 2 * (Φ(n√2) - 0.5)`, derived from the same table.
    pub fn erf(&self, n: f64) -> f64 {
        2.0 * (self.value_at(n * std::f64::consts::SQRT_2) - 0.5)
    }
}
