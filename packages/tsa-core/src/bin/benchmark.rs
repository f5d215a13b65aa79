use std::env;
use std::time::Instant;
use tsa_core::confidence::ConfidenceSolver;
use tsa_core::least_squares::{ClosedFormVariant, LeastSquaresEngine};
use tsa_core::normal_table::NormalTable;

fn main() {
    let args: Vec<String> = env::args().collect();
    let iterations: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let samples: Vec<(f64, f64)> =
        (0..200).map(|i| (i as f64, 2.0 + 3.0 * i as f64)).collect();

    // Warm up: force the table build outside the timed loop.
    let _ = NormalTable::global();
    let _ = ConfidenceSolver::by_rms(0.1, 100);
    let _ = LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = ConfidenceSolver::by_avg_and_rms(0.02, 0.2, 50);
    }
    let confidence_time = start.elapsed().as_secs_f64() / iterations as f64 * 1000.0;

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = LeastSquaresEngine::fit_closed_form(&samples, ClosedFormVariant::Linear);
    }
    let lsq_time = start.elapsed().as_secs_f64() / iterations as f64 * 1000.0;

    println!("confidence_by_avg_rms_ms:{confidence_time}");
    println!("lsq_linear_fit_ms:{lsq_time}");
    println!("total_ms:{}", confidence_time + lsq_time);
}
