use tsa_core::confidence::ConfidenceSolver;
use tsa_core::least_squares::{ClosedFormVariant, LeastSquaresEngine};
use tsa_core::normal_table::NormalTable;

fn main() {
    divan::main();
}

#[divan::bench]
fn build_normal_table() -> &'static NormalTable {
    NormalTable::global()
}

#[divan::bench]
fn confidence_by_avg_and_rms() -> f64 {
    ConfidenceSolver::by_avg_and_rms(0.02, 0.2, 50).p_eff
}

#[divan::bench(args = [50, 500, 5000])]
fn linear_fit(bencher: divan::Bencher, n: usize) {
    let samples: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 2.0 + 3.0 * i as f64)).collect();
    bencher.bench(|| LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear));
}
