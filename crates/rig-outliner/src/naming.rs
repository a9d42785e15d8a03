//! Unique label generation.
//!
//! Labels are split into a base and an optional trailing decimal suffix
//! (`"arm12"` is base `"arm"`, suffix `12`). When a wanted label collides, the
//! result is the base followed by one more than the highest suffix already
//! used with that base, or `1` if no such suffix exists yet.

use std::collections::HashSet;

/// Splits a label into its base text and trailing numeric suffix.
pub fn split_numeric_suffix(label: &str) -> (&str, Option<u64>) {
    let digits = label
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return (label, None);
    }

    let (base, suffix) = label.split_at(label.len() - digits);
    match suffix.parse::<u64>() {
        Ok(number) => (base, Some(number)),
        Err(_) => (label, None),
    }
}

/// Returns `wanted` if no label in `existing` equals it, otherwise the first
/// free suffixed variant.
///
/// ```
/// use rig_outliner::naming::unique_label;
///
/// assert_eq!(unique_label("leg", ["arm"]), "leg");
/// assert_eq!(unique_label("arm", ["arm"]), "arm1");
/// assert_eq!(unique_label("arm", ["arm", "arm1", "arm4"]), "arm5");
/// ```
pub fn unique_label<'a, I>(wanted: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: HashSet<&str> = existing.into_iter().collect();
    if !existing.contains(wanted) {
        return wanted.to_string();
    }

    let (base, _) = split_numeric_suffix(wanted);
    let highest = existing
        .iter()
        .filter_map(|label| match split_numeric_suffix(label) {
            (other_base, Some(number)) if other_base == base => Some(number),
            _ => None,
        })
        .max();

    // A base ending in digits that do not fit a u64 can produce candidates
    // that never parse back, so step until one is actually free.
    let mut next = highest.map_or(1, |number| number.saturating_add(1));
    loop {
        let candidate = format!("{base}{next}");
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
        next = next.wrapping_add(1);
    }
}
