//! Human-readable friction notes. These explain a low score to the reader;
//! they are derived from the same signals but never feed back into it.

use crate::matching::practical::age_fit;
use crate::matching::traits::compute_trait_vector;
use crate::taxonomy::{TaxonomySnapshot, CUSTOM_PREFIX};
use crate::timezone;
use crate::Profile;

/// Interests of `liker` that clash with `disliker`'s dislikes.
///
/// A clash is phrase containment in either direction, or the dislike phrase
/// canonicalizing to the liked category ("horror" dislikes vs a like that
/// landed in the horror category).
pub fn dislike_conflicts(
    liker: &Profile,
    disliker: &Profile,
    taxonomy: &TaxonomySnapshot,
) -> Vec<String> {
    let mut hits = Vec::new();
    for tag in liker.interests() {
        let base = tag.strip_prefix(CUSTOM_PREFIX).unwrap_or(&tag);
        for dislike in &disliker.dislikes {
            let contained = base.contains(dislike.as_str()) || dislike.contains(base);
            let category_hit = taxonomy.canonicalize(dislike) == tag;
            if contained || category_hit {
                hits.push(base.to_string());
                break;
            }
        }
    }
    hits
}

fn energy_label(energy: f64) -> &'static str {
    if energy > 0.6 {
        "High"
    } else if energy < 0.4 {
        "Low"
    } else {
        "Mid"
    }
}

/// Assemble all friction notes for a pair.
pub fn friction_notes(a: &Profile, b: &Profile, taxonomy: &TaxonomySnapshot) -> Vec<String> {
    let name_a = a.display_name("P1");
    let name_b = b.display_name("P2");
    let mut notes = Vec::new();

    for item in dislike_conflicts(a, b, taxonomy) {
        notes.push(format!("{name_a} likes {item}, which {name_b} dislikes."));
    }
    for item in dislike_conflicts(b, a, taxonomy) {
        notes.push(format!("{name_b} likes {item}, which {name_a} dislikes."));
    }

    if let (Some(offset_a), Some(offset_b)) = (a.timezone_offset, b.timezone_offset) {
        let gap = timezone::gap_hours(offset_a, offset_b);
        if gap > 6.0 {
            notes.push(format!("Large time difference: {gap} hours apart."));
        }
    }

    if a.age.is_some() && age_fit(a.age, b.age_preference.as_ref()) < 1.0 && b.age_preference.is_some()
    {
        if let Some(age) = a.age {
            notes.push(format!("{name_a}'s age ({age}) is outside {name_b}'s range."));
        }
    }
    if b.age.is_some() && age_fit(b.age, a.age_preference.as_ref()) < 1.0 && a.age_preference.is_some()
    {
        if let Some(age) = b.age {
            notes.push(format!("{name_b}'s age ({age}) is outside {name_a}'s range."));
        }
    }
    if a.age.is_none() || b.age.is_none() {
        notes.push("One or both profiles are missing age data, lowering confidence.".into());
    }

    let energy_a = compute_trait_vector(&a.traits, taxonomy).energy;
    let energy_b = compute_trait_vector(&b.traits, taxonomy).energy;
    if (energy_a - energy_b).abs() > 0.4 {
        notes.push(format!(
            "Energy mismatch: {}-Energy vs {}-Energy.",
            energy_label(energy_a),
            energy_label(energy_b)
        ));
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyStore;
    use crate::AgePreference;

    #[test]
    fn containment_conflict_is_reported() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        let mut a = Profile::default();
        a.likes = vec!["custom:spicy food".into()];
        let mut b = Profile::default();
        b.dislikes = vec!["spicy food".into()];

        let hits = dislike_conflicts(&a, &b, &snapshot);
        assert_eq!(hits, vec!["spicy food"]);
    }

    #[test]
    fn category_level_conflict_is_reported() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        // "horror movies" canonicalizes into the horror category, which is
        // exactly what the dislike resolves to as well.
        let mut a = Profile::default();
        a.likes = vec![snapshot.canonicalize("horror movies")];
        let mut b = Profile::default();
        b.dislikes = vec!["horror".into()];

        let hits = dislike_conflicts(&a, &b, &snapshot);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn notes_name_both_parties() {
        let store = TaxonomyStore::builtin();
        let snapshot = store.snapshot();
        let mut a = Profile::default();
        a.name = Some("Mia".into());
        a.likes = vec!["custom:loud music".into()];
        a.age = Some(30);
        let mut b = Profile::default();
        b.name = Some("Kai".into());
        b.dislikes = vec!["loud music".into()];
        b.age_preference = Some(AgePreference { min: Some(18), max: Some(25) });
        b.age = Some(22);

        let notes = friction_notes(&a, &b, &snapshot);
        assert!(notes.iter().any(|n| n.contains("Mia likes loud music")));
        assert!(notes.iter().any(|n| n.contains("Mia's age (30) is outside Kai's range.")));
    }

    #[test]
    fn missing_age_warns_once() {
        let store = TaxonomyStore::builtin();
        let notes = friction_notes(&Profile::default(), &Profile::default(), &store.snapshot());
        assert_eq!(
            notes
                .iter()
                .filter(|n| n.contains("missing age data"))
                .count(),
            1
        );
    }
}
