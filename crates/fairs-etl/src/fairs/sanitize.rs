//! Field sanitizing applied right before values are bound to statements
//!
//! Numeric parsing is permissive on purpose: the source file contains values
//! such as `S/N` (sem número) where a number is expected, and those must load
//! as "unknown" rather than abort the run.

/// Degrees are encoded as integers with six implied decimal places
const COORDINATE_SCALE: f64 = 1_000_000.0;

/// `None` for absent or empty input, otherwise at most `max_len` characters.
///
/// Longer values are cut, not rejected; the target columns are fixed-width.
pub fn bounded_string(value: Option<&str>, max_len: usize) -> Option<String> {
    match value {
        None | Some("") => None,
        Some(v) => Some(v.chars().take(max_len).collect()),
    }
}

/// Parse `raw` as an integer; anything that is not entirely an integer is 0.
pub fn permissive_int(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Decimal degrees from the integer micro-degree encoding
pub fn scaled_coordinate(raw: &str) -> f64 {
    permissive_int(raw) as f64 / COORDINATE_SCALE
}

/// House number, where 0 (including unparsable input) means unknown
pub fn house_number(raw: &str) -> Option<i32> {
    match i32::try_from(permissive_int(raw)) {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
