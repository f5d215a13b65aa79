//! `gain_window -w W [-t] [filename]` — windowed gain over a series'
//! marginal returns.

use tsa_cli::args::{parse_usize, ArgWalker};
use tsa_cli::error::CliError;
use tsa_cli::ingest::load_series;
use tsa_core::gain::GainEstimator;
use tsa_core::marginal_returns::MarginalReturnStream;

fn main() {
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("gain_window: {err}");
            err.exit_code()
        }
    });
}

fn run() -> Result<(), CliError> {
    let mut walker = ArgWalker::from_env();
    let with_timestamp = walker.take_flag("-t");
    let window = walker
        .take_value("-w", parse_usize)?
        .ok_or_else(|| CliError::Argument("-w W is required".into()))?;
    if window == 0 {
        return Err(CliError::Argument("-w must be positive".into()));
    }

    let remaining = walker.into_remaining();
    if remaining.len() > 1 {
        return Err(CliError::Argument(
            "gain_window takes at most one filename".into(),
        ));
    }
    let series = load_series(remaining.first().map(String::as_str))?;
    let mut estimator = GainEstimator::windowed(window);

    for (i, r) in MarginalReturnStream::new(&series).enumerate() {
        if let Some(sample) = estimator.observe(r) {
            if with_timestamp {
                println!("{} {}", series.samples()[i + 1].timestamp, sample.g);
            } else {
                println!("{}", sample.g);
            }
        }
    }
    Ok(())
}
