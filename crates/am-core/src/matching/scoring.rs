//! The compatibility engine: gates, per-dimension scores, adaptive
//! weighting, penalty, calibration and the final report.

use std::sync::Arc;

use tracing::debug;

use super::{
    dealbreakers::run_all_gate_checks,
    friction::{dislike_conflicts, friction_notes},
    interests::{combine_directions, directional_overlap, InterestMatch},
    practical::practical_score,
    traits::trait_similarity_score,
    weights::Weights,
};
use crate::taxonomy::{TaxonomySnapshot, TaxonomyStore};
use crate::Profile;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Credit granted when two interests only share a category family.
    pub family_credit: f64,
    /// Minimum pair strength that counts toward the overlap score.
    pub accept_threshold: f64,
    /// Penalty per like/dislike conflict.
    pub conflict_penalty_step: f64,
    /// Penalty ceiling across all conflicts.
    pub conflict_penalty_cap: f64,
    /// Linear recalibration applied to the weighted raw score.
    pub calibration_gain: f64,
    pub calibration_offset: f64,
    /// Weight of the AI opinion when blending (0 disables).
    pub ai_blend_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            family_credit: 0.78,
            accept_threshold: env_tunable("AM_ACCEPT_THRESHOLD", 0.75),
            conflict_penalty_step: 0.12,
            conflict_penalty_cap: 0.5,
            calibration_gain: 1.10,
            calibration_offset: 0.04,
            ai_blend_weight: 0.4,
        }
    }
}

fn env_tunable(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// One scored dimension.
#[derive(Debug, Clone)]
pub struct ScoringResult {
    pub score: f64,
    pub max_score: f64,
    pub status: &'static str,
    pub details: String,
}

impl ScoringResult {
    fn new(score: f64, unknown: bool, details: String) -> Self {
        Self {
            score,
            max_score: 1.0,
            status: status_from_score(score, unknown),
            details,
        }
    }
}

fn status_from_score(score: f64, unknown: bool) -> &'static str {
    if unknown {
        "UNKNOWN"
    } else if score >= 0.9 {
        "PERFECT_MATCH"
    } else if score >= 0.7 {
        "MATCH"
    } else if score >= 0.4 {
        "PARTIAL_MATCH"
    } else {
        "MISS"
    }
}

/// Verdict band shown to users.
pub fn band_label(overall_pct: u32) -> &'static str {
    if overall_pct >= 75 {
        "Excellent Match"
    } else if overall_pct >= 55 {
        "Good Potential"
    } else if overall_pct >= 40 {
        "Moderate Compatibility"
    } else {
        "Low Compatibility"
    }
}

#[derive(Debug)]
pub struct MatchReport {
    /// Final calibrated score in [0, 1]. 0.0 when a gate blocked the pair.
    pub overall: f64,
    pub band: &'static str,
    pub interests: ScoringResult,
    pub emotional: ScoringResult,
    pub practical: ScoringResult,
    pub weights: Weights,
    pub conflict_penalty: f64,
    /// Reason a gate blocked the pair, when one did.
    pub dealbreaker: Option<String>,
    /// Gate checks that could not be verified from the data.
    pub unverified_gates: Vec<String>,
    pub shared_interests: Vec<InterestMatch>,
    pub friction: Vec<String>,
    pub confidence: f64,
    pub confidence_note: String,
}

impl MatchReport {
    pub fn overall_pct(&self) -> u32 {
        (self.overall * 100.0).round() as u32
    }

    /// Fold an AI opinion (0-100) into the final score.
    pub fn blend_with_ai(&mut self, ai_score: u32, weight: f64) {
        if self.dealbreaker.is_some() {
            return;
        }
        let ai = f64::from(ai_score.min(100)) / 100.0;
        self.overall = (self.overall * (1.0 - weight) + ai * weight).clamp(0.0, 1.0);
        self.band = band_label(self.overall_pct());
    }
}

pub struct CompatibilityEngine {
    config: EngineConfig,
    taxonomy: Arc<TaxonomyStore>,
}

impl CompatibilityEngine {
    pub fn new(config: EngineConfig, taxonomy: Arc<TaxonomyStore>) -> Self {
        Self { config, taxonomy }
    }

    pub fn with_defaults(taxonomy: Arc<TaxonomyStore>) -> Self {
        Self::new(EngineConfig::default(), taxonomy)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a pair of parsed profiles.
    pub fn analyze(&self, a: &Profile, b: &Profile) -> MatchReport {
        self.taxonomy.reload_if_stale();
        let snapshot = self.taxonomy.snapshot();
        self.analyze_with_snapshot(a, b, &snapshot)
    }

    fn analyze_with_snapshot(
        &self,
        a: &Profile,
        b: &Profile,
        taxonomy: &TaxonomySnapshot,
    ) -> MatchReport {
        let gates = run_all_gate_checks(a, b);
        let unverified_gates: Vec<String> = gates
            .decisions
            .iter()
            .filter(|(_, d)| d.is_unverified())
            .map(|(name, _)| (*name).to_string())
            .collect();

        let interests_a = a.interests();
        let interests_b = b.interests();

        let (s_ab, matches_ab) = directional_overlap(
            &interests_a,
            &interests_b,
            taxonomy,
            self.config.family_credit,
            self.config.accept_threshold,
        );
        let (s_ba, matches_ba) = directional_overlap(
            &interests_b,
            &interests_a,
            taxonomy,
            self.config.family_credit,
            self.config.accept_threshold,
        );
        let interest_score = combine_directions(s_ab, s_ba);
        let interests_unknown = interests_a.is_empty() && interests_b.is_empty();

        let emotional_score = trait_similarity_score(&a.traits, &b.traits, taxonomy);
        let emotional_unknown = a.traits.is_empty() && b.traits.is_empty();

        let (practical, age_score, tz_score) = practical_score(a, b);
        let practical_unknown = a.age.is_none()
            && b.age.is_none()
            && a.timezone_offset.is_none()
            && b.timezone_offset.is_none();

        let conflicts =
            dislike_conflicts(a, b, taxonomy).len() + dislike_conflicts(b, a, taxonomy).len();
        let conflict_penalty = (conflicts as f64 * self.config.conflict_penalty_step)
            .min(self.config.conflict_penalty_cap);

        let interest_tokens = interests_a.len() + interests_b.len();
        let trait_tokens = a.traits.len() + b.traits.len();
        let weights = Weights::adaptive(interest_tokens, trait_tokens);

        let raw = interest_score * weights.interests
            + emotional_score * weights.emotional
            + practical * weights.practical;
        let penalized = (raw - conflict_penalty).max(0.0);
        let calibrated = (penalized * self.config.calibration_gain + self.config.calibration_offset)
            .clamp(0.0, 1.0);

        let overall = if gates.blocked { 0.0 } else { calibrated };

        let mut shared_interests: Vec<InterestMatch> = matches_ab;
        shared_interests.extend(matches_ba);
        shared_interests.sort_by(|x, y| {
            y.2.partial_cmp(&x.2).unwrap_or(std::cmp::Ordering::Equal)
        });
        shared_interests.dedup_by(|x, y| {
            (x.0 == y.0 && x.1 == y.1) || (x.0 == y.1 && x.1 == y.0)
        });

        let (confidence, confidence_note) = confidence_index(a, b);

        debug!(
            interest = interest_score,
            emotional = emotional_score,
            practical,
            penalty = conflict_penalty,
            overall,
            blocked = gates.blocked,
            "pair scored"
        );

        MatchReport {
            overall,
            band: band_label((overall * 100.0).round() as u32),
            interests: ScoringResult::new(
                interest_score,
                interests_unknown,
                format!("directional {s_ab:.2}/{s_ba:.2}"),
            ),
            emotional: ScoringResult::new(
                emotional_score,
                emotional_unknown,
                format!("{} vs {} trait tokens", a.traits.len(), b.traits.len()),
            ),
            practical: ScoringResult::new(
                practical,
                practical_unknown,
                format!("age {age_score:.2}, timezone {tz_score:.2}"),
            ),
            weights,
            conflict_penalty,
            dealbreaker: if gates.blocked {
                gates.blocked_reasons()
            } else {
                None
            },
            unverified_gates,
            shared_interests,
            friction: friction_notes(a, b, taxonomy),
            confidence,
            confidence_note,
        }
    }
}

/// How much of the form was actually filled in, independent of how well
/// the pair matches.
fn confidence_index(a: &Profile, b: &Profile) -> (f64, String) {
    let mut points: f64 = 0.0;
    for p in [a, b] {
        if !p.likes.is_empty() {
            points += 0.15;
        }
        if !p.hobbies.is_empty() {
            points += 0.10;
        }
        if !p.traits.is_empty() {
            points += 0.15;
        }
        if p.timezone_raw.is_some() {
            points += 0.10;
        }
        if p.age.is_some() {
            points += 0.05;
        }
        if !p.sexuality.is_empty() {
            points += 0.05;
        }
    }
    let tokens = a.interests().len() + b.interests().len();
    let confidence = (points.min(1.0) + (tokens as f64 * 0.01).min(0.15)).min(1.0);
    let note = format!("section coverage over both forms; interest tokens={tokens}");
    (confidence, note)
}
