//! Delimiter-based splitting of a string into typed tokens.

use std::str::FromStr;

/// Splits `input` on `delimiter` and parses every piece as `T`.
///
/// Empty input yields an empty vector. An empty delimiter yields the whole
/// input parsed as a single token. The first piece that fails to parse
/// aborts the split with that piece's error.
///
/// # Errors
///
/// Returns the `FromStr` error of the first piece that does not parse.
pub fn split_tokens<T: FromStr>(input: &str, delimiter: &str) -> Result<Vec<T>, T::Err> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if delimiter.is_empty() {
        return input.parse().map(|token| vec![token]);
    }
    input.split(delimiter).map(str::parse).collect()
}
