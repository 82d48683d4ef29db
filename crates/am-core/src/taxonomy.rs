//! Interest taxonomy: canonical categories, category families, trait
//! clusters and energy keywords, with an optional JSON overlay file merged
//! over the built-in defaults and hot-reloaded on mtime change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Prefix for interest tags with no taxonomy category.
pub const CUSTOM_PREFIX: &str = "custom:";

/// Built-in category -> synonym phrases.
///
/// NOTE: keep in sync with the `categories` section of the overlay file docs.
static DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "video_games",
        &[
            "gaming",
            "video games",
            "video game",
            "genshin",
            "gacha",
            "pjsk",
            "hsr",
            "hoyo",
            "minecraft",
            "fnaf",
            "hollow knight",
            "roblox",
            "fortnite",
            "valorant",
            "rivals",
            "games",
            "console",
            "ps5",
            "steam",
            "nintendo",
            "cod",
            "overwatch",
            "league",
            "sims",
            "stardew",
        ],
    ),
    (
        "anime_manga",
        &[
            "anime",
            "manga",
            "jjk",
            "kny",
            "one piece",
            "death note",
            "manhwa",
            "webtoon",
            "naruto",
            "bleach",
            "ghibli",
            "aot",
            "demon slayer",
        ],
    ),
    (
        "music",
        &[
            "music",
            "citypop",
            "indie music",
            "kpop",
            "rap",
            "r&b",
            "pop music",
            "songs",
            "singing",
            "instruments",
            "piano",
            "violin",
            "guitar",
            "drums",
            "band",
            "concerts",
        ],
    ),
    (
        "reading_writing",
        &[
            "reading",
            "books",
            "fanfiction",
            "writing",
            "poems",
            "poetry",
            "journaling",
            "novels",
            "literature",
            "ao3",
            "wattpad",
        ],
    ),
    (
        "arts_crafts",
        &[
            "art",
            "drawing",
            "graphic design",
            "graphics",
            "editing",
            "sketching",
            "crochet",
            "knitting",
            "painting",
            "digital art",
            "traditional art",
            "doodling",
            "sculpting",
            "pottery",
        ],
    ),
    (
        "photography",
        &["photography", "photos", "cameras", "matching pfps"],
    ),
    (
        "cooking_baking",
        &["cooking", "baking", "cakes", "brownies", "food", "culinary"],
    ),
    (
        "vehicles",
        &[
            "bike",
            "bikes",
            "car",
            "cars",
            "biker",
            "motorcycles",
            "racing",
        ],
    ),
    (
        "movies_tv",
        &[
            "movies",
            "films",
            "documentaries",
            "marvel",
            "sitcoms",
            "kdrama",
            "drama",
            "series",
            "youtube",
            "netflix",
            "shows",
            "cinema",
        ],
    ),
    (
        "true_crime_paranormal",
        &[
            "true crime",
            "creepypasta",
            "analog horror",
            "horror",
            "horror movie",
            "horror movies",
            "mystery",
            "ghosts",
            "paranormal",
            "supernatural",
        ],
    ),
    (
        "social_communication",
        &[
            "voice chat",
            "vcing",
            "chatting",
            "texting",
            "yapping",
            "calling",
            "talking",
            "hanging out",
            "socializing",
        ],
    ),
    (
        "sports",
        &[
            "badminton",
            "volleyball",
            "figure skating",
            "sports",
            "basketball",
            "gym",
            "football",
            "soccer",
            "skating",
            "tennis",
            "swimming",
            "working out",
        ],
    ),
    (
        "animals",
        &["cats", "dogs", "pets", "animals", "bunnies", "reptiles"],
    ),
];

/// Built-in category -> broader family, for partial-credit matching.
static DEFAULT_FAMILIES: &[(&str, &str)] = &[
    ("video_games", "fiction_media"),
    ("anime_manga", "fiction_media"),
    ("movies_tv", "fiction_media"),
    ("reading_writing", "fiction_media"),
    ("true_crime_paranormal", "horror_family"),
    ("music", "creative_family"),
    ("arts_crafts", "creative_family"),
    ("photography", "creative_family"),
    ("vehicles", "mechanical_family"),
    ("cooking_baking", "home_family"),
    ("social_communication", "social_family"),
    ("sports", "active_family"),
    ("animals", "nature_family"),
];

static DEFAULT_TRAIT_CLUSTERS: &[(&str, &[&str])] = &[
    (
        "empathic",
        &[
            "empathetic",
            "caring",
            "kind",
            "supportive",
            "understanding",
            "sweet",
            "nice",
            "patient",
            "loyal",
            "gentle",
        ],
    ),
    (
        "communicative",
        &[
            "talkative",
            "chatty",
            "yapper",
            "communicative",
            "good listener",
            "social",
            "outgoing",
        ],
    ),
    (
        "introverted",
        &[
            "shy",
            "introverted",
            "reserved",
            "quiet",
            "calm",
            "anxious",
            "loner",
        ],
    ),
    (
        "energetic",
        &[
            "bubbly", "energetic", "hyper", "playful", "funny", "chaotic", "loud", "silly",
        ],
    ),
    (
        "analytical",
        &[
            "observant",
            "analytical",
            "practical",
            "smart",
            "intelligent",
            "nerd",
            "logical",
            "serious",
        ],
    ),
    (
        "passionate",
        &[
            "affectionate",
            "clingy",
            "flirty",
            "passionate",
            "romantic",
            "obsessive",
        ],
    ),
];

static DEFAULT_ENERGY_KEYWORDS: &[(&str, f64)] = &[
    ("shy", 0.2),
    ("introverted", 0.2),
    ("calm", 0.3),
    ("quiet", 0.3),
    ("tired", 0.3),
    ("chill", 0.4),
    ("relaxed", 0.4),
    ("talkative", 0.7),
    ("chatty", 0.7),
    ("bubbly", 0.85),
    ("energetic", 0.9),
    ("hyper", 0.95),
    ("chaotic", 0.95),
    ("loud", 0.95),
];

/// Optional overlay document merged over the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct TaxonomyOverlay {
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub families: HashMap<String, String>,
    #[serde(default)]
    pub trait_clusters: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub energy_keywords: HashMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy overlay: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed taxonomy overlay: {0}")]
    Json(#[from] serde_json::Error),
}

/// One immutable, fully-built set of taxonomy maps.
#[derive(Debug)]
pub struct TaxonomySnapshot {
    variant_to_canonical: HashMap<String, String>,
    category_to_family: HashMap<String, String>,
    trait_clusters: HashMap<String, Vec<String>>,
    energy_keywords: HashMap<String, f64>,
}

impl TaxonomySnapshot {
    fn defaults() -> Self {
        let mut variant_to_canonical = HashMap::new();
        for (canonical, variants) in DEFAULT_CATEGORIES {
            for variant in *variants {
                variant_to_canonical.insert((*variant).to_string(), (*canonical).to_string());
            }
        }

        let category_to_family = DEFAULT_FAMILIES
            .iter()
            .map(|(category, family)| ((*category).to_string(), (*family).to_string()))
            .collect();

        let trait_clusters = DEFAULT_TRAIT_CLUSTERS
            .iter()
            .map(|(cluster, keywords)| {
                (
                    (*cluster).to_string(),
                    keywords.iter().map(|k| (*k).to_string()).collect(),
                )
            })
            .collect();

        let energy_keywords = DEFAULT_ENERGY_KEYWORDS
            .iter()
            .map(|(keyword, value)| ((*keyword).to_string(), *value))
            .collect();

        Self {
            variant_to_canonical,
            category_to_family,
            trait_clusters,
            energy_keywords,
        }
    }

    fn with_overlay(overlay: TaxonomyOverlay) -> Self {
        let mut snapshot = Self::defaults();

        for (canonical, variants) in overlay.categories {
            for variant in variants {
                snapshot
                    .variant_to_canonical
                    .insert(variant.to_lowercase(), canonical.clone());
            }
        }
        for (category, family) in overlay.families {
            snapshot.category_to_family.insert(category, family);
        }
        for (cluster, keywords) in overlay.trait_clusters {
            snapshot.trait_clusters.insert(
                cluster,
                keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            );
        }
        for (keyword, value) in overlay.energy_keywords {
            snapshot
                .energy_keywords
                .insert(keyword.to_lowercase(), value.clamp(0.0, 1.0));
        }

        snapshot
    }

    fn best_substring_category(&self, text: &str) -> Option<&str> {
        // Longest variant wins so "art" inside "article" cannot beat a more
        // specific phrase; variants of <= 3 chars never substring-match.
        let mut best: Option<(&str, usize)> = None;
        for (variant, canonical) in &self.variant_to_canonical {
            if variant.len() > 3 && text.contains(variant.as_str()) {
                let better = match best {
                    None => true,
                    Some((_, best_len)) => variant.len() > best_len,
                };
                if better {
                    best = Some((canonical.as_str(), variant.len()));
                }
            }
        }
        best.map(|(canonical, _)| canonical)
    }

    /// Map a cleaned interest token to its canonical category, or a
    /// `custom:` tag preserving the text.
    pub fn canonicalize(&self, token: &str) -> String {
        let cleaned = nfkc_lower_trim(token);
        if cleaned.is_empty() {
            return format!("{CUSTOM_PREFIX}{}", token.trim().to_lowercase());
        }

        if let Some(stripped) = cleaned.strip_prefix(CUSTOM_PREFIX) {
            // Already-canonical input is stable under re-canonicalization.
            return self.canonicalize(stripped);
        }
        if self.category_to_family.contains_key(&cleaned)
            || self.variant_to_canonical.values().any(|c| c == &cleaned)
        {
            return cleaned;
        }

        if let Some(canonical) = self.variant_to_canonical.get(&cleaned) {
            return canonical.clone();
        }
        if let Some(canonical) = self.best_substring_category(&cleaned) {
            return canonical.to_string();
        }

        format!("{CUSTOM_PREFIX}{cleaned}")
    }

    /// Broader family of a canonical or `custom:` tag, if any.
    pub fn family_of(&self, tag: &str) -> Option<String> {
        if let Some(raw) = tag.strip_prefix(CUSTOM_PREFIX) {
            let category = self.best_substring_category(raw)?;
            return self.category_to_family.get(category).cloned();
        }
        self.category_to_family.get(tag).cloned()
    }

    pub fn trait_clusters(&self) -> &HashMap<String, Vec<String>> {
        &self.trait_clusters
    }

    pub fn energy_keywords(&self) -> &HashMap<String, f64> {
        &self.energy_keywords
    }
}

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

struct StoreState {
    snapshot: Arc<TaxonomySnapshot>,
    loaded_mtime: Option<SystemTime>,
}

/// Process-wide taxonomy store. Constructed once and injected into the
/// parser and engine; reload swaps the snapshot reference atomically so
/// concurrent readers see fully-old or fully-new maps, never a mix.
pub struct TaxonomyStore {
    overlay_path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl TaxonomyStore {
    /// Built-in defaults only, no overlay file.
    pub fn builtin() -> Self {
        Self {
            overlay_path: None,
            state: RwLock::new(StoreState {
                snapshot: Arc::new(TaxonomySnapshot::defaults()),
                loaded_mtime: None,
            }),
        }
    }

    /// Defaults merged with an overlay file; a missing or malformed overlay
    /// is logged and ignored.
    pub fn with_overlay(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (snapshot, mtime) = match load_overlay(&path) {
            Ok(Some((overlay, mtime))) => {
                (TaxonomySnapshot::with_overlay(overlay), Some(mtime))
            }
            Ok(None) => (TaxonomySnapshot::defaults(), None),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "taxonomy overlay unusable; using built-in defaults");
                (TaxonomySnapshot::defaults(), None)
            }
        };

        Self {
            overlay_path: Some(path),
            state: RwLock::new(StoreState {
                snapshot: Arc::new(snapshot),
                loaded_mtime: mtime,
            }),
        }
    }

    /// Store configured from `AM_TAXONOMY_FILE`, falling back to defaults.
    pub fn from_env() -> Self {
        match std::env::var("AM_TAXONOMY_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::with_overlay(path),
            _ => Self::builtin(),
        }
    }

    /// Current snapshot. The `Arc` keeps it valid across a concurrent reload.
    pub fn snapshot(&self) -> Arc<TaxonomySnapshot> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot
            .clone()
    }

    /// Re-read the overlay when its mtime changed. Cheap no-op when the file
    /// is absent or unchanged; a failed re-read keeps the previous snapshot.
    pub fn reload_if_stale(&self) {
        let Some(path) = self.overlay_path.as_deref() else {
            return;
        };
        let Ok(metadata) = std::fs::metadata(path) else {
            return;
        };
        let Ok(mtime) = metadata.modified() else {
            return;
        };

        {
            let state = self
                .state
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.loaded_mtime == Some(mtime) {
                return;
            }
        }

        match load_overlay(path) {
            Ok(Some((overlay, mtime))) => {
                let snapshot = Arc::new(TaxonomySnapshot::with_overlay(overlay));
                let mut state = self
                    .state
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                state.snapshot = snapshot;
                state.loaded_mtime = Some(mtime);
                debug!(path = %path.display(), "taxonomy overlay reloaded");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "taxonomy overlay reload failed; keeping previous snapshot");
            }
        }
    }

    /// Convenience passthrough for callers that do not hold a snapshot.
    pub fn canonicalize(&self, token: &str) -> String {
        self.snapshot().canonicalize(token)
    }

    pub fn family_of(&self, tag: &str) -> Option<String> {
        self.snapshot().family_of(tag)
    }
}

fn load_overlay(path: &Path) -> Result<Option<(TaxonomyOverlay, SystemTime)>, TaxonomyError> {
    if !path.exists() {
        return Ok(None);
    }
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;
    let raw = std::fs::read_to_string(path)?;
    let overlay: TaxonomyOverlay = serde_json::from_str(&raw)?;
    Ok(Some((overlay, mtime)))
}
