//! Personality scoring: cluster-intensity vectors plus a social-energy
//! scalar mined from the free-text trait list.

use std::collections::HashMap;

use crate::taxonomy::TaxonomySnapshot;

#[derive(Debug, Clone)]
pub struct TraitVector {
    pub clusters: HashMap<String, f64>,
    pub energy: f64,
}

/// Collapse a trait list into per-cluster intensities and an energy scalar.
///
/// Three keyword hits saturate a cluster. Energy is the mean of matched
/// energy-keyword values; no hits means unknown, which sits at 0.5.
pub fn compute_trait_vector(traits: &[String], taxonomy: &TaxonomySnapshot) -> TraitVector {
    let blob = traits.join(" ").to_lowercase();

    let clusters = taxonomy
        .trait_clusters()
        .iter()
        .map(|(name, keywords)| {
            let count = keywords.iter().filter(|kw| blob.contains(kw.as_str())).count();
            (name.clone(), (count as f64 / 3.0).min(1.0))
        })
        .collect();

    let energy_hits: Vec<f64> = taxonomy
        .energy_keywords()
        .iter()
        .filter(|(kw, _)| blob.contains(kw.as_str()))
        .map(|(_, value)| *value)
        .collect();
    let energy = if energy_hits.is_empty() {
        0.5
    } else {
        energy_hits.iter().sum::<f64>() / energy_hits.len() as f64
    };

    TraitVector { clusters, energy }
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let keys: std::collections::HashSet<&String> = a.keys().chain(b.keys()).collect();
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for key in keys {
        let x = a.get(key).copied().unwrap_or(0.0);
        let y = b.get(key).copied().unwrap_or(0.0);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    // A zero vector uses norm 1.0 so the whole score degrades instead of
    // dividing by zero.
    let na = if norm_a == 0.0 { 1.0 } else { norm_a.sqrt() };
    let nb = if norm_b == 0.0 { 1.0 } else { norm_b.sqrt() };
    dot / (na * nb)
}

/// Cosine over cluster vectors, blended with how close the two energy
/// levels sit. The 0.9 dampening keeps a full energy gap from zeroing the
/// bonus entirely.
pub fn trait_similarity_score(
    traits_a: &[String],
    traits_b: &[String],
    taxonomy: &TaxonomySnapshot,
) -> f64 {
    let va = compute_trait_vector(traits_a, taxonomy);
    let vb = compute_trait_vector(traits_b, taxonomy);
    let cos = cosine(&va.clusters, &vb.clusters);
    let energy_bonus = (1.0 - (va.energy - vb.energy).abs() * 0.9).max(0.0);
    (0.75 * cos + 0.25 * energy_bonus).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyStore;

    fn traits(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cluster_intensity_saturates_at_three_hits() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        let v = compute_trait_vector(
            &traits(&["kind", "caring", "sweet", "patient", "gentle"]),
            &snapshot,
        );
        assert_eq!(v.clusters.get("empathic"), Some(&1.0));
    }

    #[test]
    fn energy_defaults_to_midpoint_without_keywords() {
        let store = TaxonomyStore::builtin();
        let v = compute_trait_vector(&traits(&["mysterious"]), &store.snapshot());
        assert_eq!(v.energy, 0.5);
    }

    #[test]
    fn similar_trait_lists_score_high() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        let a = traits(&["shy", "kind", "caring"]);
        let b = traits(&["quiet", "sweet", "supportive"]);
        let score = trait_similarity_score(&a, &b, &snapshot);
        assert!(score > 0.8, "got {score}");
    }

    #[test]
    fn opposed_energy_levels_drag_the_score() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        let calm = traits(&["shy", "quiet"]);
        let loud = traits(&["hyper", "loud", "chaotic"]);
        let matched = trait_similarity_score(&calm, &calm.clone(), &snapshot);
        let opposed = trait_similarity_score(&calm, &loud, &snapshot);
        assert!(matched > opposed);
    }

    #[test]
    fn empty_lists_stay_in_range() {
        let store = TaxonomyStore::builtin();
        let score = trait_similarity_score(&[], &[], &store.snapshot());
        assert!((0.0..=1.0).contains(&score));
    }
}
