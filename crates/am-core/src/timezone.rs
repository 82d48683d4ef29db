//! Best-effort timezone parsing from free-text profile fields.

use once_cell::sync::Lazy;
use regex::Regex;

/// Common abbreviations -> UTC offset in hours.
static ABBREVIATIONS: &[(&str, f64)] = &[
    ("est", -5.0),
    ("edt", -4.0),
    ("cst", -6.0),
    ("cdt", -5.0),
    ("mst", -7.0),
    ("mdt", -6.0),
    ("pst", -8.0),
    ("pdt", -7.0),
    ("gmt", 0.0),
    ("utc", 0.0),
    ("bst", 1.0),
    ("cet", 1.0),
    ("ist", 5.5),
    ("pkt", 5.0),
];

static RE_UTC_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:utc|gmt)\s*([+-])\s*(\d{1,2})(?::(\d{2})|(\.5))?").unwrap());

static RE_BARE_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)([+-])\s*(\d{1,2})(?::(\d{2}))?(?:\s|$)").unwrap());

/// Whether the text declares no timezone preference at all.
///
/// "any" is matched as a standalone word so "any works" and "any tz" count
/// but "germany" does not.
pub fn is_any(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if matches!(
        lowered.as_str(),
        "anywhere" | "anything" | "all" | "dont care" | "don't care" | "doesnt matter" | "doesn't matter" | "idc" | "no preference"
    ) {
        return true;
    }
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "any")
}

/// Parse a UTC offset in hours out of a timezone field.
///
/// Accepts abbreviations ("est", "pkt"), explicit offsets ("UTC+5:30",
/// "gmt-8") and bare signed offsets ("+2"). Returns `None` when nothing
/// recognizable is present.
pub fn parse_offset(text: &str) -> Option<f64> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() || is_any(&lowered) {
        return None;
    }

    if let Some(caps) = RE_UTC_OFFSET.captures(&lowered) {
        let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
        let hours: f64 = caps[2].parse().ok()?;
        let minutes = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|m| m / 60.0)
            .unwrap_or_else(|| if caps.get(4).is_some() { 0.5 } else { 0.0 });
        // An explicit offset is authoritative; out-of-range means the field
        // is garbage, not that "utc" alone should win.
        return (hours <= 14.0).then_some(sign * (hours + minutes));
    }

    // Abbreviations are matched on word boundaries so "best" never reads as
    // "bst".
    for (abbrev, offset) in ABBREVIATIONS {
        let found = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == *abbrev);
        if found {
            return Some(*offset);
        }
    }

    if let Some(caps) = RE_BARE_OFFSET.captures(&lowered) {
        let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
        let hours: f64 = caps[2].parse().ok()?;
        let minutes = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|m| m / 60.0)
            .unwrap_or(0.0);
        if hours <= 14.0 {
            return Some(sign * (hours + minutes));
        }
    }

    None
}

/// Absolute gap in hours between two offsets.
pub fn gap_hours(a: f64, b: f64) -> f64 {
    (a - b).abs()
}
