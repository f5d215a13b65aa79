//! Error types shared across the core.
//!
//! Numerical guards (zero rms, complex radicals) never appear here: per the
//! confidence-solver design they are handled locally with a fallback
//! estimate and no exception escapes. Only structural/algorithmic failures
//! — a malformed input record, a singular regression, or a cancelled fit —
//! are surfaced.

use thiserror::Error;

/// A single ingestion-time failure. The offending record is skipped and
/// processing continues; this type exists so the caller can still see a
/// terse, locale-independent diagnostic for it.
#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("expected at least {expected} whitespace-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unparsable value field {field:?}")]
    BadValue { field: String },

    #[error("non-positive value {value} rejected")]
    NonPositiveValue { value: f64 },

    #[error("unparsable date {date:?}")]
    BadDate { date: String },
}
