//! Formatting utilities for human-readable output
//!
//! Provides consistent formatting functions for the application.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Bytes per megabyte constant
pub const MB: u64 = 1024 * 1024;

/// Shown for sizes that are zero or not numeric
pub const UNKNOWN_SIZE: &str = "Unknown";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Convert bytes to megabytes as f64 (for calculations and logging)
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / MB as f64
}

/// Format a byte count using the largest unit whose mantissa is at least 1,
/// rounded to two decimals (e.g. "4.52 GB", "1 GB")
pub fn format_file_size(bytes: u64) -> String {
    format_size_value(bytes as f64)
}

/// Same as [`format_file_size`] for sizes sent as numeric strings
pub fn format_file_size_str(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(size) => format_size_value(size),
        Err(_) => UNKNOWN_SIZE.to_string(),
    }
}

fn format_size_value(size: f64) -> String {
    if !size.is_finite() || size <= 0.0 {
        return UNKNOWN_SIZE.to_string();
    }

    let mut value = size;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

/// Two decimal places with trailing zeros dropped ("1.50" -> "1.5", "2.00" -> "2")
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a backend timestamp as a calendar date.
///
/// `localized` selects the Chinese long form ("2024年10月1日"),
/// otherwise "October 1, 2024". Unparsable input yields "Invalid Date".
pub fn format_date(raw: &str, localized: bool) -> String {
    let Some(date) = parse_date(raw.trim()) else {
        return "Invalid Date".to_string();
    };

    if localized {
        date.format("%Y年%-m月%-d日").to_string()
    } else {
        date.format("%B %-d, %Y").to_string()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}

/// Truncate to `max_chars` characters, ending with `suffix` when cut
pub fn truncate_text(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}
