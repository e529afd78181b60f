//! Version ordering helpers
//!
//! Windows release labels come in three shapes: `24H2`, `19045` and
//! `10.0.19045`. Each maps to a single sortable key; anything else is 0.

use std::cmp::Ordering;

use crate::api::SelectOption;

/// Sortable key for a version label, larger is newer
pub fn parse_version(version: &str) -> u64 {
    if let Some(key) = parse_half_year(version) {
        return key;
    }

    if is_digits(version) {
        return version.parse().unwrap_or(u64::MAX);
    }

    let parts: Vec<&str> = version.split('.').collect();
    if let [major, minor, patch] = parts.as_slice() {
        if is_digits(major) && is_digits(minor) && is_digits(patch) {
            let major: u64 = major.parse().unwrap_or(0);
            let minor: u64 = minor.parse().unwrap_or(0);
            let patch: u64 = patch.parse().unwrap_or(0);
            return major
                .saturating_mul(1_000_000)
                .saturating_add(minor.saturating_mul(1_000))
                .saturating_add(patch);
        }
    }

    0
}

/// `YYH<half>`, exactly two year digits and one half digit
fn parse_half_year(version: &str) -> Option<u64> {
    let bytes = version.as_bytes();
    if bytes.len() != 4 || bytes[2] != b'H' {
        return None;
    }
    let (year, half) = (&version[..2], &version[3..]);
    if !is_digits(year) || !is_digits(half) {
        return None;
    }
    let year: u64 = year.parse().ok()?;
    let half: u64 = half.parse().ok()?;
    Some(year * 10 + half)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn compare_versions(a: &str, b: &str) -> Ordering {
    parse_version(a).cmp(&parse_version(b))
}

pub fn is_newer_version(a: &str, b: &str) -> bool {
    compare_versions(a, b) == Ordering::Greater
}

/// Sort options newest first.
///
/// Labels look like `VerCode(BuildVer)`; only the part before `(` is compared.
/// The sort is stable so unrecognized labels keep their backend order.
pub fn sort_versions_desc(options: &[SelectOption]) -> Vec<SelectOption> {
    let mut sorted = options.to_vec();
    sorted.sort_by(|a, b| compare_versions(version_part(&b.label), version_part(&a.label)));
    sorted
}

fn version_part(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}
