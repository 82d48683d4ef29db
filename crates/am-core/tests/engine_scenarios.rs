//! End-to-end scenarios: raw decorated forms in, reports out.

use std::sync::Arc;

use am_core::matching::{CompatibilityEngine, EngineConfig};
use am_core::parser::{parse_profile, split_self_and_preferences};
use am_core::taxonomy::TaxonomyStore;
use am_core::Profile;

fn engine_with(store: TaxonomyStore) -> CompatibilityEngine {
    CompatibilityEngine::new(EngineConfig::default(), Arc::new(store))
}

fn parse_form(store: &TaxonomyStore, form: &str) -> Profile {
    let (self_block, _) = split_self_and_preferences(form);
    parse_profile(&self_block, &store.snapshot())
}

#[test]
fn decorated_forms_with_heavy_overlap_score_excellent() {
    let store = TaxonomyStore::builtin();
    let form_a = "╰ Name: Mia\n\
                  ╰ Age: 19 (18-22)\n\
                  ╰ Gender: female\n\
                  ╰ Sexuality: bi\n\
                  ╰ Time zone: est\n\
                  ╰ Likes: gaming, (genshin impact), anime!!\n\
                  ╰ Hobbies: drawing and crochet\n\
                  ╰ Traits: shy, kind, caring\n\
                  𝓣𝒉𝒆𝒎\n\
                  Age: 18-22";
    let form_b = "Name: Kai\n\
                  Age: 20, 18 to 22\n\
                  Gender: male\n\
                  Sexuality: pan\n\
                  Timezone: edt\n\
                  Likes: video games, manga, sketching\n\
                  Traits: quiet, sweet, supportive";

    let a = parse_form(&store, form_a);
    let b = parse_form(&store, form_b);
    assert_eq!(a.name.as_deref(), Some("Mia"));
    assert!(a.likes.contains(&"video_games".to_string()));
    assert!(a.likes.contains(&"anime_manga".to_string()));

    let report = engine_with(store).analyze(&a, &b);
    assert!(report.dealbreaker.is_none());
    assert!(report.overall_pct() >= 75, "got {}", report.overall_pct());
    assert_eq!(report.band, "Excellent Match");
}

#[test]
fn orientation_dealbreaker_outranks_perfect_interests() {
    let store = TaxonomyStore::builtin();
    let form_a = "Name: A\nGender: female\nSexuality: lesbian\nLikes: gaming, anime\nTraits: shy";
    let form_b = "Name: B\nGender: male\nSexuality: gay\nLikes: gaming, anime\nTraits: shy";

    let a = parse_form(&store, form_a);
    let b = parse_form(&store, form_b);
    let report = engine_with(store).analyze(&a, &b);

    assert!(report.dealbreaker.is_some());
    assert_eq!(report.overall, 0.0);
    assert_eq!(report.overall_pct(), 0);
}

#[test]
fn horror_dislike_creates_conflict_and_friction() {
    let store = TaxonomyStore::builtin();
    let form_a = "Name: A\nLikes: horror movies, gaming\nTraits: calm";
    let form_b = "Name: B\nLikes: gaming\nDislikes: horror\nTraits: calm";

    let a = parse_form(&store, form_a);
    let b = parse_form(&store, form_b);
    let report = engine_with(store).analyze(&a, &b);

    assert!(report.conflict_penalty > 0.0);
    assert!(report
        .friction
        .iter()
        .any(|note| note.contains("dislikes")));
}

#[test]
fn parser_never_fails_on_hostile_input() {
    let store = TaxonomyStore::builtin();
    let hostile = [
        "",
        "????",
        "𝓛𝓲𝓴𝓮𝓼 𝓪𝓷𝓭 𝓭𝓲𝓼𝓵𝓲𝓴𝓮𝓼",
        "Likes: Likes: Likes:",
        &"x".repeat(10_000),
    ];
    for form in hostile {
        let profile = parse_form(&store, form);
        let report = engine_with(TaxonomyStore::builtin())
            .analyze(&profile, &Profile::default());
        assert!((0.0..=1.0).contains(&report.overall));
    }
}

#[test]
fn report_is_order_independent() {
    let store = TaxonomyStore::builtin();
    // Timezone on one side only; sub-score statuses must still agree.
    let a = parse_form(
        &store,
        "Name: A\nAge: 20\nTimezone: est\nLikes: music, cooking\nTraits: bubbly",
    );
    let b = parse_form(&store, "Name: B\nAge: 40\nLikes: cars, sports\nTraits: serious");

    let e = engine_with(store);
    let ab = e.analyze(&a, &b);
    let ba = e.analyze(&b, &a);
    assert!((ab.overall - ba.overall).abs() < 1e-9);
    assert!((ab.confidence - ba.confidence).abs() < 1e-9);
    assert_eq!(ab.interests.status, ba.interests.status);
    assert_eq!(ab.emotional.status, ba.emotional.status);
    assert_eq!(ab.practical.status, ba.practical.status);
}

#[test]
fn overlay_reload_picks_up_new_vocabulary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let overlay = dir.path().join("taxonomy.json");

    std::fs::write(
        &overlay,
        r#"{"categories": {"tabletop": ["dnd"]}, "families": {"tabletop": "fiction_media"}}"#,
    )
    .expect("write overlay");

    let store = TaxonomyStore::with_overlay(&overlay);
    assert_eq!(store.canonicalize("dnd"), "tabletop");
    assert_eq!(store.canonicalize("warhammer"), "custom:warhammer");

    // Rewrite the overlay with a newer mtime and confirm the snapshot swaps.
    std::thread::sleep(std::time::Duration::from_millis(20));
    std::fs::write(
        &overlay,
        r#"{"categories": {"tabletop": ["dnd", "warhammer"]}}"#,
    )
    .expect("rewrite overlay");
    filetime_bump(&overlay);

    store.reload_if_stale();
    assert_eq!(store.canonicalize("warhammer"), "tabletop");
    // Built-ins survive every reload.
    assert_eq!(store.canonicalize("gaming"), "video_games");
}

// Some filesystems have coarse mtime resolution; force a distinct timestamp.
fn filetime_bump(path: &std::path::Path) {
    let file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .expect("reopen overlay");
    file.set_modified(std::time::SystemTime::now())
        .expect("set mtime");
}

#[test]
fn tiny_token_never_matches_across_lengths() {
    use am_core::matching::interests::fuzzy_match_score;
    assert_eq!(fuzzy_match_score("custom:ai", "custom:hockey"), 0.0);
    assert_eq!(fuzzy_match_score("custom:hockey", "custom:ai"), 0.0);
}
