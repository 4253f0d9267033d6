//! Time-of-day parsing and canonicalization.

use chrono::NaiveTime;
use thiserror::Error;

/// Errors from time-of-day parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Unrecognized time format: {0:?}, expected HH:mm or HHmm")]
    UnrecognizedFormat(String),

    #[error("Not a valid time of day: {0:?}")]
    OutOfRange(String),
}

/// Canonicalize a user-supplied time-of-day string to `HH:mm`.
///
/// Accepts four bare digits (`"0456"`) or a colon form with a one- or
/// two-digit hour (`"4:56"`, `"04:56"`). Surrounding whitespace is trimmed.
/// The candidate is revalidated by constructing a real [`NaiveTime`], so
/// shapes like `"99:99"` are rejected even though they match the pattern.
pub fn normalize_time(raw: &str) -> Result<String, TimeParseError> {
    let trimmed = raw.trim();

    let candidate = if is_bare_digits(trimmed) {
        format!("{}:{}", &trimmed[..2], &trimmed[2..])
    } else if is_colon_form(trimmed) {
        trimmed.to_string()
    } else {
        return Err(TimeParseError::UnrecognizedFormat(raw.to_string()));
    };

    let time = NaiveTime::parse_from_str(&candidate, "%H:%M")
        .map_err(|_| TimeParseError::OutOfRange(candidate.clone()))?;

    Ok(time.format("%H:%M").to_string())
}

/// Validate an already-canonical `HH:mm` string without transforming it.
///
/// Stricter than [`normalize_time`]: the hour must be zero-padded to two
/// digits. Used where canonical input is an invariant rather than user input.
pub fn parse_canonical(value: &str) -> Result<NaiveTime, TimeParseError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit();

    if !shape_ok {
        return Err(TimeParseError::UnrecognizedFormat(value.to_string()));
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| TimeParseError::OutOfRange(value.to_string()))
}

fn is_bare_digits(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_colon_form(s: &str) -> bool {
    let Some((hours, minutes)) = s.split_once(':') else {
        return false;
    };

    (1..=2).contains(&hours.len())
        && minutes.len() == 2
        && hours.bytes().all(|b| b.is_ascii_digit())
        && minutes.bytes().all(|b| b.is_ascii_digit())
}
