//! `shannon_effective [-c] [-e] AVG RMS N` — P and Peff under all three
//! confidence estimators, plus Pcomp when `-c` is given.
//! `shannon_effective -e N` — `erf(1/√N)` and its complement, alone.

use tsa_cli::args::{parse_f64, parse_u64, ArgWalker};
use tsa_cli::error::CliError;
use tsa_core::confidence::ConfidenceSolver;
use tsa_core::normal_table::NormalTable;
use tsa_core::run_length::RunLengthCompensator;

fn main() {
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("shannon_effective: {err}");
            err.exit_code()
        }
    });
}

fn run() -> Result<(), CliError> {
    let mut walker = ArgWalker::from_env();
    let with_comp = walker.take_flag("-c");
    let erf_only = walker.take_flag("-e");
    let positional = walker.into_remaining();

    if erf_only && positional.len() == 1 {
        let n = parse_u64(&positional[0])
            .ok_or_else(|| CliError::Argument(format!("invalid N: {:?}", positional[0])))?;
        let e = NormalTable::global().erf(1.0 / (n.max(1) as f64).sqrt());
        println!("erf={e} complement={}", 1.0 - e);
        return Ok(());
    }

    if positional.len() != 3 {
        return Err(CliError::Argument(
            "usage: shannon_effective [-c] [-e] AVG RMS N".into(),
        ));
    }
    let avg = parse_f64(&positional[0])
        .ok_or_else(|| CliError::Argument(format!("invalid AVG: {:?}", positional[0])))?;
    let rms = parse_f64(&positional[1])
        .ok_or_else(|| CliError::Argument(format!("invalid RMS: {:?}", positional[1])))?;
    let n = parse_u64(&positional[2])
        .ok_or_else(|| CliError::Argument(format!("invalid N: {:?}", positional[2])))?;

    for (name, estimate) in [
        ("ByRms", ConfidenceSolver::by_rms(rms, n)),
        ("ByAvg", ConfidenceSolver::by_avg(avg, rms, n)),
        ("ByAvgRms", ConfidenceSolver::by_avg_and_rms(avg, rms, n)),
    ] {
        if with_comp {
            let p_comp = RunLengthCompensator::compensated_probability(estimate.p_eff, n);
            println!(
                "{name}: P={} Peff={} Pcomp={p_comp}",
                estimate.p, estimate.p_eff
            );
        } else {
            println!("{name}: P={} Peff={}", estimate.p, estimate.p_eff);
        }
    }
    Ok(())
}
