//! Label-based profile parser for decorated free-text intro posts.
//!
//! Parsing is total: any input yields a `Profile`, with unrecognized or
//! missing data left as defaults. Garbage in, sparse profile out.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::{normalize_text, tokenize_interest_field};
use crate::taxonomy::TaxonomySnapshot;
use crate::timezone;
use crate::{AgePreference, Profile};

/// Stylized header marking the start of the partner-preferences section.
const THEM_HEADER: &str = "𝓣𝒉𝒆𝒎";

static RE_THEM_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n\s*thems?\b").unwrap());
static RE_THEM_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bthems?\b").unwrap());

static RE_AGE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\b").unwrap());
static RE_AGE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*(?:-|to)\s*(\d{1,2})").unwrap());
static RE_AGE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})\s*\+").unwrap());

/// Label table scanned in order against the start of each line. Ordering is
/// load-bearing: "sexuality" before "gender"/"sex", "dislikes" before
/// "likes", since earlier prefixes would otherwise shadow later fields.
static LABELS: &[(Field, &[&str])] = &[
    (Field::Name, &["name"]),
    (Field::Age, &["age", "ag ", "ag:", "ages"]),
    (Field::Sexuality, &["sexuality", "orientation"]),
    (Field::Gender, &["gender", "sex"]),
    (Field::TimeZone, &["time zone", "timezone", "time"]),
    (Field::Dislikes, &["dislikes", "dislike"]),
    (Field::Likes, &["likes", "like"]),
    (Field::Hobbies, &["hobbies", "hobby"]),
    (Field::Traits, &["your traits", "their traits", "traits"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Name,
    Age,
    Gender,
    Sexuality,
    TimeZone,
    Dislikes,
    Likes,
    Hobbies,
    Traits,
}

/// Split a full post into the self-description block and, when present, the
/// partner-preferences block.
///
/// The stylized header is searched literally first. The plain-word fallbacks
/// refuse to split within 10 chars of either end, where a stray "them" in
/// running text is near-certain to be a false positive.
pub fn split_self_and_preferences(full_text: &str) -> (String, Option<String>) {
    if let Some(idx) = full_text.find(THEM_HEADER) {
        return (
            full_text[..idx].trim().to_string(),
            Some(full_text[idx..].trim().to_string()),
        );
    }

    if let Some(m) = RE_THEM_LINE.find(full_text) {
        let idx = m.start();
        return (
            full_text[..idx].trim().to_string(),
            Some(full_text[idx..].trim().to_string()),
        );
    }

    if let Some(m) = RE_THEM_WORD.find(full_text) {
        let idx = m.start();
        if idx > 10 && idx < full_text.len().saturating_sub(10) {
            return (
                full_text[..idx].trim().to_string(),
                Some(full_text[idx..].trim().to_string()),
            );
        }
    }

    (full_text.trim().to_string(), None)
}

/// Match one line against the label table. Returns the field and whatever
/// content follows the label on the same line.
fn match_label(line: &str) -> Option<(Field, String)> {
    let lower = line.to_lowercase();
    for (field, variants) in LABELS {
        for variant in *variants {
            if let Some(after) = lower.strip_prefix(variant) {
                // A label must end at a word boundary: "liked it" is not a
                // "like" line.
                if after.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false) {
                    continue;
                }
                let content = line[variant.len()..]
                    .trim_start_matches([' ', ':', '-'])
                    .trim()
                    .to_string();
                return Some((*field, content));
            }
        }
    }
    None
}

fn parse_age_field(raw: &str) -> (Option<u32>, Option<AgePreference>) {
    let lower = raw.to_lowercase();

    let age = RE_AGE_VALUE
        .captures(&lower)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|&n| (13..=100).contains(&n));

    if let Some(caps) = RE_AGE_RANGE.captures(&lower) {
        let min = caps[1].parse::<u32>().ok();
        let max = caps[2].parse::<u32>().ok();
        return (age, Some(AgePreference { min, max }));
    }
    if let Some(caps) = RE_AGE_OPEN.captures(&lower) {
        let min = caps[1].parse::<u32>().ok();
        return (age, Some(AgePreference { min, max: None }));
    }

    (age, None)
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Parse one profile block into a structured `Profile`.
pub fn parse_profile(block: &str, taxonomy: &TaxonomySnapshot) -> Profile {
    let mut profile = Profile {
        raw_text: block.to_string(),
        ..Profile::default()
    };

    let text = normalize_text(block);

    let mut accum: std::collections::HashMap<Field, Vec<String>> =
        std::collections::HashMap::new();
    let mut current: Option<Field> = None;
    let mut pending_question: Option<String> = None;

    for line in text.lines() {
        if let Some((field, content)) = match_label(line) {
            pending_question = None;
            current = Some(field);
            let entry = accum.entry(field).or_default();
            if !content.is_empty() {
                entry.push(content);
            }
            continue;
        }

        if let Some(question) = pending_question.take() {
            profile
                .other_answers
                .insert(question, line.trim().to_lowercase());
            continue;
        }

        if let Some(field) = current {
            if let Some(entry) = accum.get_mut(&field) {
                entry.push(line.to_string());
            }
        } else if let Some((question, answer)) = line.split_once('?') {
            let question = question.trim().to_lowercase();
            let answer = answer.trim().to_lowercase();
            if answer.is_empty() {
                pending_question = Some(question);
            } else {
                profile.other_answers.insert(question, answer);
            }
        }
    }

    let joined = |field: Field| -> Option<String> {
        accum.get(&field).map(|parts| parts.join(" "))
    };
    // List fields keep the line break as a delimiter so continuation lines
    // stay separate tokens.
    let joined_lines = |field: Field| -> Option<String> {
        accum.get(&field).map(|parts| parts.join("\n"))
    };

    profile.name = joined(Field::Name).filter(|n| !n.is_empty());

    if let Some(age_raw) = joined(Field::Age) {
        let (age, preference) = parse_age_field(&age_raw);
        profile.age = age;
        profile.age_preference = preference;
    }

    profile.gender = joined(Field::Gender).unwrap_or_default().to_lowercase();
    profile.sexuality = joined(Field::Sexuality).unwrap_or_default().to_lowercase();

    if let Some(tz_raw) = joined(Field::TimeZone) {
        profile.timezone_offset = timezone::parse_offset(&tz_raw);
        profile.timezone_raw = Some(tz_raw);
    }

    if let Some(raw) = joined_lines(Field::Likes) {
        let tags = tokenize_interest_field(&raw)
            .iter()
            .map(|t| taxonomy.canonicalize(t))
            .collect();
        profile.likes = dedup_preserving_order(tags);
    }
    if let Some(raw) = joined_lines(Field::Hobbies) {
        let tags = tokenize_interest_field(&raw)
            .iter()
            .map(|t| taxonomy.canonicalize(t))
            .collect();
        profile.hobbies = dedup_preserving_order(tags);
    }
    if let Some(raw) = joined_lines(Field::Dislikes) {
        profile.dislikes = dedup_preserving_order(tokenize_interest_field(&raw));
    }
    if let Some(raw) = joined_lines(Field::Traits) {
        profile.traits = dedup_preserving_order(tokenize_interest_field(&raw));
    }

    profile
}
