//! The data model and the adapter that produces it.
//!
//! [`SeriesNormaliser`] is the only piece of the CSV/date path that the
//! core retains: temporal sorting, reverse-order iteration, and
//! blank/comment-aware record policy. Argument parsing, file framing, and
//! everything else belongs to the CLI collaborator.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// One time-ordered observation. `value` must be strictly positive for any
/// input fed to the log/ratio routines; callers are expected to have
/// already dropped non-positive values upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: String,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// A finite, temporally ascending, immutable sequence of [`Sample`]s.
/// Timestamps are required to be weakly increasing; duplicates are
/// tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Build a series from already-ascending samples.
    ///
    /// Returns `None` if the timestamps are not weakly increasing.
    pub fn from_samples(samples: Vec<Sample>) -> Option<Self> {
        if samples
            .windows(2)
            .any(|w| w[1].timestamp < w[0].timestamp)
        {
            return None;
        }
        Some(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The bare value sequence, in ascending time order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.timestamp.as_str())
    }
}

/// Parses the canonical temporal-database record format and the Yahoo-style
/// CSV export into [`Series`].
pub struct SeriesNormaliser;

impl SeriesNormaliser {
    /// Parse whitespace-separated canonical records: `<timestamp>
    /// <identifier> <value> [extra...]`. Blank lines are ignored; lines
    /// whose first non-whitespace character is `#` are comments. The last
    /// field is the value, the first is the timestamp. Malformed records
    /// are skipped (with the error returned alongside for diagnostics) and
    /// processing continues.
    pub fn parse_canonical(input: &str) -> (Series, Vec<IngestError>) {
        let mut samples = Vec::new();
        let mut errors = Vec::new();

        for line in input.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < 3 {
                errors.push(IngestError::FieldCount {
                    expected: 3,
                    found: fields.len(),
                });
                continue;
            }
            let timestamp = fields[0];
            let raw_value = fields[fields.len() - 1];
            match raw_value.parse::<f64>() {
                Ok(value) if value > 0.0 => samples.push(Sample::new(timestamp, value)),
                Ok(value) => errors.push(IngestError::NonPositiveValue { value }),
                Err(_) => errors.push(IngestError::BadValue {
                    field: raw_value.to_string(),
                }),
            }
        }

        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        (Series { samples }, errors)
    }

    /// Parse a Yahoo-style CSV export: header `Date,Open,High,Low,Close,Volume`,
    /// rows in descending-time order, emitted in ascending-time order. The
    /// fifth field is close.
    ///
    /// The upstream format historically carries an extra trailing field
    /// (seven rather than the documented six); this parser accepts both 6
    /// and 7 fields per row rather than rejecting the common case.
    pub fn parse_yahoo_csv(input: &str) -> (Series, Vec<IngestError>) {
        let mut samples = Vec::new();
        let mut errors = Vec::new();

        for (line_no, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if line_no == 0 && trimmed.starts_with("Date,") {
                continue;
            }

            let fields: Vec<&str> = trimmed.split(',').collect();
            if fields.len() != 6 && fields.len() != 7 {
                errors.push(IngestError::FieldCount {
                    expected: 6,
                    found: fields.len(),
                });
                continue;
            }

            let timestamp = match parse_yahoo_date(fields[0]) {
                Some(ts) => ts,
                None => {
                    errors.push(IngestError::BadDate {
                        date: fields[0].to_string(),
                    });
                    continue;
                }
            };

            match fields[4].parse::<f64>() {
                Ok(close) if close > 0.0 => samples.push(Sample::new(timestamp, close)),
                Ok(close) => errors.push(IngestError::NonPositiveValue { value: close }),
                Err(_) => errors.push(IngestError::BadValue {
                    field: fields[4].to_string(),
                }),
            }
        }

        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        (Series { samples }, errors)
    }
}

/// Parses `D-Mon-YY` or `D-MM-YY` into a lexically sortable `YYYY-MM-DD`
/// string. Two-digit years `>= 70` are taken as 19xx, else 20xx — the
/// classic Yahoo Finance epoch convention.
fn parse_yahoo_date(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month = parse_month(parts[1])?;
    let yy: u32 = parts[2].parse().ok()?;
    let year = if yy >= 70 { 1900 + yy } else { 2000 + yy };
    if !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn parse_month(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(raw))
        .map(|i| i as u32 + 1)
}
