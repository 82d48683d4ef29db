//! Logistics scoring: timezone distance and mutual age-preference fit.

use crate::timezone;
use crate::Profile;

/// Step function over the hour gap. "any timezone" on either side is a
/// mild positive, missing data is neutral.
pub fn timezone_score(a: &Profile, b: &Profile) -> f64 {
    let any_a = a.timezone_raw.as_deref().map(timezone::is_any).unwrap_or(false);
    let any_b = b.timezone_raw.as_deref().map(timezone::is_any).unwrap_or(false);
    if any_a || any_b {
        return 0.65;
    }

    let (Some(offset_a), Some(offset_b)) = (a.timezone_offset, b.timezone_offset) else {
        return 0.5;
    };

    match timezone::gap_hours(offset_a, offset_b) {
        gap if gap <= 1.0 => 1.0,
        gap if gap <= 3.0 => 0.9,
        gap if gap <= 6.0 => 0.65,
        gap if gap <= 9.0 => 0.4,
        _ => 0.2,
    }
}

/// Whether one person's age satisfies the other's stated preference.
/// Missing age or missing preference is neutral.
pub fn age_fit(age: Option<u32>, preference: Option<&crate::AgePreference>) -> f64 {
    match (age, preference) {
        (Some(age), Some(pref)) => {
            if pref.is_open() {
                0.5
            } else if pref.contains(age) {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.5,
    }
}

pub fn age_score(a: &Profile, b: &Profile) -> f64 {
    let a_in_b = age_fit(a.age, b.age_preference.as_ref());
    let b_in_a = age_fit(b.age, a.age_preference.as_ref());
    (a_in_b + b_in_a) / 2.0
}

/// Age carries more weight than timezone: a hard age mismatch is a social
/// problem, a timezone gap is a scheduling one.
pub fn practical_score(a: &Profile, b: &Profile) -> (f64, f64, f64) {
    let age = age_score(a, b);
    let tz = timezone_score(a, b);
    (0.6 * age + 0.4 * tz, age, tz)
}
