//! Hard gates evaluated before any scoring. A blocked pair never receives
//! a compatibility score; missing data downgrades a check to unverified
//! rather than blocking.

use crate::Profile;

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Incompatibility is explicit in the data. Scoring is skipped.
    Blocked { reason: String },
    /// The data needed for this check is absent or ambiguous.
    Unverified { reason: String },
    /// Nothing in the data contradicts the pairing.
    Clear,
}

impl GateDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GateDecision::Blocked { .. })
    }

    pub fn is_unverified(&self) -> bool {
        matches!(self, GateDecision::Unverified { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            GateDecision::Blocked { reason } => Some(reason),
            GateDecision::Unverified { reason } => Some(reason),
            GateDecision::Clear => None,
        }
    }
}

/// Aggregate over all gate checks.
#[derive(Debug)]
pub struct GateResult {
    pub blocked: bool,
    pub decisions: Vec<(&'static str, GateDecision)>,
}

impl GateResult {
    pub fn new(decisions: Vec<(&'static str, GateDecision)>) -> Self {
        let blocked = decisions.iter().any(|(_, d)| d.is_blocked());
        Self { blocked, decisions }
    }

    /// Reasons for blocked checks, joined for display.
    pub fn blocked_reasons(&self) -> Option<String> {
        let reasons: Vec<&str> = self
            .decisions
            .iter()
            .filter(|(_, d)| d.is_blocked())
            .filter_map(|(_, d)| d.reason())
            .collect();
        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}

pub fn run_all_gate_checks(a: &Profile, b: &Profile) -> GateResult {
    let decisions = vec![
        ("orientation", check_orientation(a, b)),
        ("trans_preference", check_trans_preference(a, b)),
        ("poly_preference", check_poly_preference(a, b)),
    ];
    GateResult::new(decisions)
}

/// Whether `sexuality` suggests attraction to `gender`. Unknown or catch-all
/// orientations always return true; the gate only fires on explicit signals.
///
/// Rule order matters: "lesbian" contains "bi", so the most specific labels
/// are tested first.
fn attracted_to(sexuality: &str, gender: &str) -> bool {
    let s = sexuality.trim().to_lowercase();
    let g = gender.trim().to_lowercase();
    if s.is_empty() || s.contains("any") {
        return true;
    }
    if s.contains("lesbian") {
        return gender_reads_as(&g, &["fem", "wom", "girl", "gal"]);
    }
    if s.contains("gay") {
        return gender_reads_as(&g, &["masc", "man", "male", "boy", "guy"]);
    }
    if s.contains("bi") || s.contains("pan") {
        return true;
    }
    true
}

/// Gender words are matched as token prefixes, never raw substrings:
/// "female" must not be read as "male", nor "woman" as "man".
fn gender_reads_as(gender: &str, markers: &[&str]) -> bool {
    gender
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .any(|token| markers.iter().any(|m| token.starts_with(m)))
}

fn check_orientation(a: &Profile, b: &Profile) -> GateDecision {
    if a.sexuality.is_empty() && b.sexuality.is_empty() {
        return GateDecision::Unverified {
            reason: "no sexuality data on either profile".into(),
        };
    }
    let a_to_b = attracted_to(&a.sexuality, &b.gender);
    let b_to_a = attracted_to(&b.sexuality, &a.gender);
    if !a_to_b && !b_to_a {
        GateDecision::Blocked {
            reason: "Neither person's declared sexuality suggests attraction to the other's declared gender.".into(),
        }
    } else {
        GateDecision::Clear
    }
}

/// Interpret a free-text answer to a "do you mind ..." question.
/// `Some(true)` means they do mind.
fn parse_minds(answer: &str) -> Option<bool> {
    let lower = answer.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if ["no", "don't", "dont", "nope", "nah"].iter().any(|w| lower.contains(w)) {
        return Some(false);
    }
    if ["yes", "i do", "prefer", "i mind"].iter().any(|w| lower.contains(w)) {
        return Some(true);
    }
    None
}

fn minds_answer<'a>(profile: &'a Profile, topic: &str) -> Option<&'a str> {
    profile
        .other_answers
        .iter()
        .find(|(question, _)| question.contains("mind") && question.contains(topic))
        .map(|(_, answer)| answer.as_str())
}

fn identity_blob(profile: &Profile) -> String {
    let mut blob = format!("{} {}", profile.gender, profile.sexuality);
    for t in &profile.traits {
        blob.push(' ');
        blob.push_str(t);
    }
    blob.to_lowercase()
}

fn check_preference(
    a: &Profile,
    b: &Profile,
    topic: &str,
    identity_markers: &[&str],
    reason: &str,
) -> GateDecision {
    let mut any_question = false;
    for (asker, other) in [(a, b), (b, a)] {
        let Some(answer) = minds_answer(asker, topic) else {
            continue;
        };
        any_question = true;
        match parse_minds(answer) {
            Some(true) => {
                let blob = identity_blob(other);
                if identity_markers.iter().any(|m| blob.contains(m)) {
                    return GateDecision::Blocked {
                        reason: reason.to_string(),
                    };
                }
            }
            Some(false) => {}
            None => {
                return GateDecision::Unverified {
                    reason: format!("ambiguous answer to the {topic} question"),
                };
            }
        }
    }

    if any_question {
        GateDecision::Clear
    } else {
        GateDecision::Unverified {
            reason: format!("no {topic} preference stated"),
        }
    }
}

fn check_trans_preference(a: &Profile, b: &Profile) -> GateDecision {
    check_preference(
        a,
        b,
        "trans",
        &["trans", "mtf", "ftm"],
        "One person does not accept trans partners while the other is trans.",
    )
}

fn check_poly_preference(a: &Profile, b: &Profile) -> GateDecision {
    check_preference(
        a,
        b,
        "poly",
        &["poly"],
        "One person prefers monogamy while the other indicates polyamory.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gender: &str, sexuality: &str) -> Profile {
        Profile {
            gender: gender.into(),
            sexuality: sexuality.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn one_sided_mismatch_stays_clear() {
        // The gate fires only when neither direction holds. "straight" is
        // not an explicit signal here, so that direction passes.
        let a = profile("male", "gay");
        let b = profile("female", "straight");
        let result = run_all_gate_checks(&a, &b);
        assert!(!result.blocked);
    }

    #[test]
    fn mutual_mismatch_blocks() {
        let a = profile("male", "lesbian");
        let b = profile("male", "lesbian");
        let result = run_all_gate_checks(&a, &b);
        assert!(result.blocked);
        assert!(result.blocked_reasons().is_some());
    }

    #[test]
    fn feminine_genders_are_not_read_as_masculine() {
        // "female" contains "male" and "woman" contains "man"; token-prefix
        // matching keeps those apart.
        assert!(!attracted_to("gay", "female"));
        assert!(!attracted_to("gay", "woman"));
        assert!(attracted_to("gay", "male"));
        assert!(attracted_to("gay", "trans man"));
        assert!(!attracted_to("lesbian", "male"));
        assert!(attracted_to("lesbian", "trans woman"));

        let a = profile("female", "lesbian");
        let b = profile("male", "gay");
        let result = run_all_gate_checks(&a, &b);
        assert!(result.blocked);
    }

    #[test]
    fn gay_and_straight_males_stay_clear() {
        // "straight" is never an explicit refusal signal, so one direction
        // always holds and the pair is left to scoring.
        let a = profile("male", "gay");
        let b = profile("male", "straight");
        let result = run_all_gate_checks(&a, &b);
        assert!(!result.blocked);
    }

    #[test]
    fn lesbian_is_not_read_as_bi() {
        // "lesbian" contains the substring "bi"; the specific rule must win.
        assert!(!attracted_to("lesbian", "male"));
        assert!(attracted_to("lesbian", "female"));
        assert!(attracted_to("bi", "male"));
    }

    #[test]
    fn missing_data_never_blocks() {
        let a = Profile::default();
        let b = Profile::default();
        let result = run_all_gate_checks(&a, &b);
        assert!(!result.blocked);
        assert!(result.decisions.iter().all(|(_, d)| d.is_unverified()));
    }

    #[test]
    fn trans_preference_blocks_when_stated_and_applicable() {
        let mut a = profile("female", "straight");
        a.other_answers
            .insert("do you mind them being trans".into(), "yes i do".into());
        let mut b = profile("trans woman", "straight");
        b.traits = vec!["kind".into()];

        let result = run_all_gate_checks(&a, &b);
        assert!(result.blocked);
    }

    #[test]
    fn trans_preference_clear_when_they_do_not_mind() {
        let mut a = profile("female", "straight");
        a.other_answers
            .insert("do you mind them being trans".into(), "nope".into());
        let b = profile("trans woman", "straight");

        let decision = check_trans_preference(&a, &b);
        assert_eq!(decision, GateDecision::Clear);
    }

    #[test]
    fn ambiguous_answer_is_unverified() {
        let mut a = profile("female", "bi");
        a.other_answers
            .insert("do you mind them being poly".into(), "hmm maybe".into());
        let b = profile("male", "bi");

        let decision = check_poly_preference(&a, &b);
        assert!(decision.is_unverified());
    }
}
