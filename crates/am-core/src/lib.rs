pub mod feedback;
pub mod llm;
pub mod logging;
pub mod match_id;
pub mod matching;
pub mod normalize;
pub mod parser;
pub mod taxonomy;
pub mod timezone;

use std::collections::BTreeMap;

/// Desired partner age range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgePreference {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl AgePreference {
    /// Whether `age` satisfies this range (open bounds always satisfied).
    pub fn contains(&self, age: u32) -> bool {
        self.min.map_or(true, |min| age >= min) && self.max.map_or(true, |max| age <= max)
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

// Parsed representation of one submitted profile form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub age_preference: Option<AgePreference>,
    /// Lower-cased free-form declaration; empty string = unknown.
    pub gender: String,
    pub sexuality: String,
    /// Hours relative to UTC, if the timezone text was parseable.
    pub timezone_offset: Option<f64>,
    /// Original timezone text, kept for display and "any timezone" detection.
    pub timezone_raw: Option<String>,
    /// Canonical category tags or `custom:<token>` tags, insertion-ordered, deduped.
    pub likes: Vec<String>,
    pub hobbies: Vec<String>,
    /// Lower-cased free phrases (not canonicalized).
    pub dislikes: Vec<String>,
    pub traits: Vec<String>,
    /// Free-form Q&A lines: lower-cased question -> lower-cased answer.
    pub other_answers: BTreeMap<String, String>,
    /// Original submitted block, retained for the AI opinion adapter.
    pub raw_text: String,
}

impl Profile {
    /// Display name with a positional fallback ("P1" / "P2").
    pub fn display_name(&self, fallback: &str) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Likes and hobbies combined, preserving order.
    pub fn interests(&self) -> Vec<String> {
        let mut combined = self.likes.clone();
        combined.extend(self.hobbies.iter().cloned());
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_preference_open_bounds_always_match() {
        let open_min = AgePreference {
            min: None,
            max: Some(25),
        };
        assert!(open_min.contains(13));
        assert!(open_min.contains(25));
        assert!(!open_min.contains(26));

        let open_max = AgePreference {
            min: Some(18),
            max: None,
        };
        assert!(open_max.contains(99));
        assert!(!open_max.contains(17));
    }

    #[test]
    fn display_name_falls_back_for_missing_or_empty() {
        let mut profile = Profile::default();
        assert_eq!(profile.display_name("P1"), "P1");
        profile.name = Some(String::new());
        assert_eq!(profile.display_name("P1"), "P1");
        profile.name = Some("mia".into());
        assert_eq!(profile.display_name("P1"), "mia");
    }
}
