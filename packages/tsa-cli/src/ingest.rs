//! File framing around [`tsa_core::series::SeriesNormaliser`]: reads from a
//! named file or, absent one, standard input, and sniffs which of the two
//! record formats it's looking at.

use std::io::Read;

use tsa_core::error::IngestError;
use tsa_core::series::{Series, SeriesNormaliser};

use crate::error::CliError;

/// Load a [`Series`] from `path` (or stdin when `None`), auto-detecting
/// Yahoo-style CSV (header starts with `Date,`) versus the canonical
/// whitespace record format. Row-level errors are printed to stderr as
/// they're found; ingestion continues past them.
pub fn load_series(path: Option<&str>) -> Result<Series, CliError> {
    let input = read_input(path)?;
    let (series, errors) = if input.trim_start().starts_with("Date,") {
        SeriesNormaliser::parse_yahoo_csv(&input)
    } else {
        SeriesNormaliser::parse_canonical(&input)
    };
    for err in &errors {
        report_ingest_error(err);
    }
    Ok(series)
}

fn report_ingest_error(err: &IngestError) {
    eprintln!("tsa-cli: skipping malformed record: {err}");
}

fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|source| CliError::Open {
                path: path.to_string(),
                source,
            })
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Open {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buf)
        }
    }
}
