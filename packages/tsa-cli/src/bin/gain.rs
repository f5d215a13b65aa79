//! `gain [-p] [-t] [filename]` — streaming cumulative gain over a series'
//! marginal returns.
//! `gain -a AVG -r RMS` or `gain -P P -r RMS` — closed-form gain from
//! already-known statistics, no series required.

use tsa_cli::args::{parse_f64, ArgWalker};
use tsa_cli::error::CliError;
use tsa_cli::ingest::load_series;
use tsa_core::gain::{gain_from_p_rms, shannon_probability, GainEstimator};
use tsa_core::marginal_returns::MarginalReturnStream;

fn main() {
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("gain: {err}");
            err.exit_code()
        }
    });
}

fn run() -> Result<(), CliError> {
    let mut walker = ArgWalker::from_env();
    let quiet = walker.take_flag("-p");
    let with_timestamp = walker.take_flag("-t");
    let avg = walker.take_value("-a", parse_f64)?;
    let rms = walker.take_value("-r", parse_f64)?;
    let p_given = walker.take_value("-P", parse_f64)?;

    if rms.is_some() {
        let rms = rms.unwrap();
        let p = match (avg, p_given) {
            (Some(avg), None) => shannon_probability(avg, rms),
            (None, Some(p)) => p,
            _ => {
                return Err(CliError::Argument(
                    "exactly one of -a or -P is required alongside -r".into(),
                ))
            }
        };
        println!("{}", gain_from_p_rms(p, rms));
        return Ok(());
    }

    let remaining = walker.into_remaining();
    if remaining.len() > 1 {
        return Err(CliError::Argument("gain takes at most one filename".into()));
    }
    let series = load_series(remaining.first().map(String::as_str))?;
    let mut estimator = GainEstimator::cumulative();
    let mut last_line = String::new();

    for (i, r) in MarginalReturnStream::new(&series).enumerate() {
        if let Some(sample) = estimator.observe(r) {
            let line = if with_timestamp {
                format!("{} {}", series.samples()[i + 1].timestamp, sample.g)
            } else {
                sample.g.to_string()
            };
            if !quiet {
                println!("{line}");
            }
            last_line = line;
        }
    }

    if quiet {
        println!("{last_line}");
    }
    Ok(())
}
