//! Epoch-seconds ↔ formatted-string conversion, in UTC.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

/// Default date/time pattern: `YYYYMMDDHHMMSS`.
pub const DEFAULT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Errors from date/time conversion.
#[derive(Debug, Error)]
pub enum DateTimeError {
    /// Epoch seconds outside the representable date range.
    #[error("epoch seconds out of range: {0}")]
    OutOfRange(i64),
    /// Format pattern rejected by the formatter.
    #[error("invalid format pattern: {0}")]
    InvalidPattern(String),
    /// Input string did not match the pattern.
    #[error("invalid date/time string: {0}")]
    Parse(#[from] chrono::ParseError),
}

/// Formats epoch seconds with the [default pattern](DEFAULT_FORMAT):
/// `format_datetime(0)` is `"19700101000000"`.
///
/// # Errors
///
/// [`DateTimeError::OutOfRange`] if `epoch_secs` is not a representable
/// date.
pub fn format_datetime(epoch_secs: i64) -> Result<String, DateTimeError> {
    format_datetime_with(epoch_secs, DEFAULT_FORMAT)
}

/// Formats epoch seconds with a caller-supplied `strftime`-style pattern.
///
/// # Errors
///
/// [`DateTimeError::OutOfRange`] for unrepresentable epochs,
/// [`DateTimeError::InvalidPattern`] if the pattern has invalid specifiers.
pub fn format_datetime_with(epoch_secs: i64, pattern: &str) -> Result<String, DateTimeError> {
    let datetime =
        DateTime::from_timestamp(epoch_secs, 0).ok_or(DateTimeError::OutOfRange(epoch_secs))?;
    let mut out = String::new();
    write!(out, "{}", datetime.format(pattern))
        .map_err(|_| DateTimeError::InvalidPattern(pattern.to_owned()))?;
    Ok(out)
}

/// Parses a string in the [default pattern](DEFAULT_FORMAT) into epoch
/// seconds: `parse_datetime("19700101000000")` is `0`.
///
/// # Errors
///
/// [`DateTimeError::Parse`] if the input does not match the pattern.
pub fn parse_datetime(input: &str) -> Result<i64, DateTimeError> {
    parse_datetime_with(input, DEFAULT_FORMAT)
}

/// Parses a string with a caller-supplied `strftime`-style pattern into
/// epoch seconds. The input is taken as UTC.
///
/// # Errors
///
/// [`DateTimeError::Parse`] if the input does not match the pattern or the
/// pattern itself is malformed.
pub fn parse_datetime_with(input: &str, pattern: &str) -> Result<i64, DateTimeError> {
    let naive = NaiveDateTime::parse_from_str(input, pattern)?;
    Ok(naive.and_utc().timestamp())
}
