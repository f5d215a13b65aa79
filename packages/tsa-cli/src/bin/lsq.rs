//! `lsq [-e|-L|-l|-R|-S] [-c C] [-f STEP] [-m METHOD] [-i] [-o] [-p] [-s] [-t] [filename]`
//!
//! Variant selectors (default linear): `-e` exponential, `-L` logarithmic,
//! `-l` logistic, `-R` square-root, `-S` square. Logistic-only options:
//! `-c C` initial carrying-capacity guess, `-f STEP` inflation step, `-m
//! METHOD` the 0-5 update rule, `-i` emits a per-iteration convergence
//! trace to stderr. Output selectors: `-o` prints the re-evaluated fit
//! series, `-s` prints the residual series, otherwise the formula string
//! alone is printed. `-t` prepends each row's timestamp to series output.

use tsa_cli::args::{parse_f64, parse_u8, ArgWalker};
use tsa_cli::error::CliError;
use tsa_cli::ingest::load_series;
use tsa_core::least_squares::{
    ClosedFormVariant, FitOptions, FitOutput, FitResult, LeastSquaresEngine, LogisticMethod,
    LogisticOptions,
};

fn main() {
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("lsq: {err}");
            err.exit_code()
        }
    });
}

fn run() -> Result<(), CliError> {
    let mut walker = ArgWalker::from_env();
    let variant_flag = walker.take_any_flag(&["-e", "-L", "-l", "-R", "-S"]);
    let start_c = walker.take_value("-c", parse_f64)?;
    let step_c = walker.take_value("-f", parse_f64)?;
    let method = walker.take_value("-m", parse_u8)?;
    let trace = walker.take_flag("-i");
    let output_series = walker.take_flag("-o");
    let residual = walker.take_flag("-s");
    let with_timestamp = walker.take_flag("-t");
    let _print_formula = walker.take_flag("-p");

    let remaining = walker.into_remaining();
    if remaining.len() > 1 {
        return Err(CliError::Argument("lsq takes at most one filename".into()));
    }
    let series = load_series(remaining.first().map(String::as_str))?;
    if series.is_empty() {
        return Err(CliError::Argument("no data to fit".into()));
    }
    let samples: Vec<(f64, f64)> = series
        .values()
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i as f64, v))
        .collect();

    let result = if variant_flag.as_deref() == Some("-l") {
        let method = method
            .map(|m| {
                LogisticMethod::from_flag(m)
                    .ok_or_else(|| CliError::Argument(format!("invalid -m METHOD: {m}")))
            })
            .transpose()?
            .unwrap_or(LogisticMethod::Delta);
        let opts = LogisticOptions {
            start_c: start_c.unwrap_or(0.0),
            step_c: step_c.unwrap_or(1.1),
            method,
            emit_convergence_trace: trace,
            cancel: None,
        };
        LeastSquaresEngine::fit_logistic(&samples, &opts)
            .map_err(|e| CliError::Argument(e.to_string()))?
    } else {
        let variant = match variant_flag.as_deref() {
            Some("-e") => ClosedFormVariant::Exponential,
            Some("-L") => ClosedFormVariant::Logarithmic,
            Some("-R") => ClosedFormVariant::SquareRoot,
            Some("-S") => ClosedFormVariant::Square,
            _ => ClosedFormVariant::Linear,
        };
        LeastSquaresEngine::fit_closed_form(&samples, variant)
            .map_err(|e| CliError::Argument(e.to_string()))?
    };

    print_result(&result, &series, &samples, output_series, residual, with_timestamp);
    Ok(())
}

fn print_result(
    result: &FitResult,
    series: &tsa_core::series::Series,
    samples: &[(f64, f64)],
    output_series: bool,
    residual: bool,
    with_timestamp: bool,
) {
    let opts = FitOptions {
        subtract_fit: residual,
        scale_to_fit: false,
    };

    if !output_series && !residual {
        if let FitOutput::Formula(formula) = LeastSquaresEngine::present(result, samples, opts) {
            println!("{formula}");
        }
        return;
    }

    let fit_series: Vec<f64> = samples.iter().map(|&(t, _)| result.evaluate(t)).collect();
    let values: Vec<f64> = if residual {
        match LeastSquaresEngine::present(result, samples, opts) {
            FitOutput::Residual(r) => r,
            _ => unreachable!("subtract_fit requested a residual"),
        }
    } else {
        fit_series
    };

    for (i, value) in values.iter().enumerate() {
        if with_timestamp {
            println!("{} {value}", series.samples()[i].timestamp);
        } else {
            println!("{value}");
        }
    }
}
