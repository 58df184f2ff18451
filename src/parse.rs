//! Lenient parsers for form text.
//!
//! None of these fail: invalid input degrades to zero (or "no value") so a
//! half-typed field never blocks the form.

use chrono::{DateTime, NaiveDate};

/// Parses a currency field such as `"$1,250.50"`.
///
/// Everything except digits and `.` is dropped, only the first decimal point
/// is kept, and anything unparsable becomes `0.0`.
pub fn lenient_currency(input: &str) -> f64 {
    let mut cleaned = String::with_capacity(input.len());
    let mut seen_point = false;
    for c in input.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_point {
            seen_point = true;
            cleaned.push(c);
        }
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parses a digits-only count field (pairs, boxes). Non-digits are ignored.
pub fn lenient_count(input: &str) -> u64 {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Parses a size quantity as typed by the user. Negative or invalid values clamp to 0.
pub fn lenient_quantity(input: &str) -> u32 {
    let trimmed = input.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    match trimmed[..end].parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Extracts the day count from a label like `"10 días naturales"`.
pub fn production_days(label: &str) -> Option<i64> {
    let head = label.split(' ').next()?;
    head.parse().ok()
}

/// Parses a stored date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (taken as UTC).
pub fn stored_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.naive_utc().date()))
}

/// Formats a date the way records store it.
pub fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
