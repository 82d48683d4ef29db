//! Interest overlap scoring over canonical tags and `custom:` free tags.

use strsim::normalized_levenshtein;

use crate::taxonomy::{TaxonomySnapshot, CUSTOM_PREFIX};

/// One accepted pairing: tag from side A, best tag from side B, strength.
pub type InterestMatch = (String, String, f64);

fn de_prefix(tag: &str) -> &str {
    tag.strip_prefix(CUSTOM_PREFIX).unwrap_or(tag).trim()
}

/// Textual similarity of two tags.
///
/// Exact equality is 1.0. Tags of wildly different lengths score 0 outright,
/// which keeps "ai" from matching inside "painting". Substring containment of
/// two real words is near-certain (0.95); otherwise normalized edit distance
/// decides.
pub fn fuzzy_match_score(a: &str, b: &str) -> f64 {
    let a = de_prefix(a);
    let b = de_prefix(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let length_ratio = shorter.len() as f64 / longer.len() as f64;
    if length_ratio < 0.7 {
        return 0.0;
    }

    if a.len() > 3 && b.len() > 3 && (longer.contains(shorter)) {
        return 0.95;
    }

    normalized_levenshtein(a, b)
}

/// Directional overlap: how much of `list_a` is covered by `list_b`.
///
/// Each A tag takes its best counterpart in B; family kinship grants partial
/// credit when textual similarity fails. Only matches at or above the accept
/// threshold contribute. Both sides empty is unknown, not zero.
pub fn directional_overlap(
    list_a: &[String],
    list_b: &[String],
    taxonomy: &TaxonomySnapshot,
    family_credit: f64,
    accept_threshold: f64,
) -> (f64, Vec<InterestMatch>) {
    if list_a.is_empty() && list_b.is_empty() {
        return (0.5, Vec::new());
    }

    let mut matches = Vec::new();
    let mut score_sum = 0.0;

    for a in list_a {
        let mut best_score = 0.0;
        let mut best_b: Option<&String> = None;
        for b in list_b {
            let mut s = fuzzy_match_score(a, b);
            if s < 0.7 {
                let fam_a = taxonomy.family_of(a);
                let fam_b = taxonomy.family_of(b);
                if fam_a.is_some() && fam_a == fam_b {
                    s = s.max(family_credit);
                }
            }
            if s > best_score {
                best_score = s;
                best_b = Some(b);
            }
        }

        if best_score >= accept_threshold {
            score_sum += best_score;
            if let Some(b) = best_b {
                matches.push((a.clone(), b.clone(), best_score));
            }
        }
    }

    let denom = list_a.len().max(1) as f64;
    ((score_sum / denom).min(1.0), matches)
}

/// Order-independent combination of the two directional scores. The stronger
/// direction dominates: one person recognizing most of the other's interests
/// matters more than perfect mutual coverage.
pub fn combine_directions(s_ab: f64, s_ba: f64) -> f64 {
    s_ab.max(s_ba) * 0.7 + s_ab.min(s_ba) * 0.3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyStore;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_tags_match_fully() {
        assert_eq!(fuzzy_match_score("video_games", "video_games"), 1.0);
        assert_eq!(fuzzy_match_score("custom:chess", "chess"), 1.0);
    }

    #[test]
    fn short_against_long_is_rejected() {
        // The length-ratio gate, not edit distance, handles this case.
        assert_eq!(fuzzy_match_score("ai", "hockey"), 0.0);
        assert_eq!(fuzzy_match_score("custom:ai", "custom:painting"), 0.0);
    }

    #[test]
    fn substring_of_real_words_scores_high() {
        let s = fuzzy_match_score("custom:cats", "custom:cats and dogs");
        assert_eq!(s, 0.0); // length ratio 4/13 blocks it first

        let close = fuzzy_match_score("custom:anime", "custom:animes");
        assert!((close - 0.95).abs() < 1e-9);
    }

    #[test]
    fn family_kinship_earns_partial_credit() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        // video_games and anime_manga share fiction_media.
        let (score, matches) = directional_overlap(
            &tags(&["video_games"]),
            &tags(&["anime_manga"]),
            &snapshot,
            0.78,
            0.75,
        );
        assert!((score - 0.78).abs() < 1e-9);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn unrelated_tags_do_not_contribute() {
        let store = TaxonomyStore::builtin();
        let (score, matches) = directional_overlap(
            &tags(&["sports"]),
            &tags(&["anime_manga"]),
            &store.snapshot(),
            0.78,
            0.75,
        );
        assert_eq!(score, 0.0);
        assert!(matches.is_empty());
    }

    #[test]
    fn both_empty_is_neutral() {
        let store = TaxonomyStore::builtin();
        let (score, matches) =
            directional_overlap(&[], &[], &store.snapshot(), 0.78, 0.75);
        assert_eq!(score, 0.5);
        assert!(matches.is_empty());
    }

    #[test]
    fn direction_combination_is_symmetric() {
        assert_eq!(combine_directions(0.9, 0.3), combine_directions(0.3, 0.9));
        assert!((combine_directions(0.9, 0.3) - (0.9 * 0.7 + 0.3 * 0.3)).abs() < 1e-9);
    }
}
