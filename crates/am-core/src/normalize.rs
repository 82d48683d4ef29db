use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_NON_ASCII: Regex = Regex::new(r"[^\x00-\x7F]+").unwrap();
    static ref RE_BRACKETED: Regex = Regex::new(r"\(.*?\)|\[.*?\]|\*.*?\*").unwrap();
    static ref RE_PUNCT: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref RE_AND_WORD: Regex = Regex::new(r"(?i)\band\b").unwrap();
    static ref RE_DELIMS: Regex = Regex::new(r"[,\n;/|•\-!]+").unwrap();
}

/// Filler verbs/articles stripped from interest tokens. Without this, short
/// connector words dominate edit-distance ratios downstream.
const NOISE_WORDS: &[&str] = &[
    "playing",
    "listening",
    "watching",
    "reading",
    "making",
    "creating",
    "doing",
    "to",
    "the",
    "in",
    "on",
    "at",
    "a",
    "an",
    "my",
    "i",
    "like",
    "love",
    "enjoy",
    "baking",
    "cooking",
    "practice",
    "practicing",
];

/// A field with no list delimiters and more than this many words is treated
/// as prose, not a tag list.
const PROSE_WORD_LIMIT: usize = 12;

/// Normalize a raw submitted block into clean, tokenizable ASCII lines.
///
/// Stylized separator glyphs become line/space breaks, all remaining
/// non-ASCII is dropped (decorative unicode carries no field content),
/// line-internal whitespace collapses, blank lines are removed.
/// Pure; empty input yields empty output.
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '╰' | '𐔌' => '\n',
            '꒰' | '୧' => ' ',
            other => other,
        })
        .collect();

    let ascii = RE_NON_ASCII.replace_all(&replaced, " ");

    ascii
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip bracketed asides, punctuation and noise words from one fragment.
///
/// A fragment that is nothing but a bracketed aside keeps its content
/// ("(genshin impact)" is still a tag), and a fragment that is a single
/// word keeps it even when it appears in the noise list ("reading" alone
/// is an interest; "reading books" is an interest with filler).
pub fn clean_interest_token(fragment: &str) -> String {
    let lower = fragment.to_lowercase();
    let mut without_brackets = RE_BRACKETED.replace_all(&lower, "").into_owned();
    if without_brackets.trim().is_empty() {
        without_brackets = lower.clone();
    }
    let without_punct = RE_PUNCT.replace_all(&without_brackets, " ");

    let words: Vec<&str> = without_punct.split_whitespace().collect();
    let kept: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| !NOISE_WORDS.contains(word))
        .collect();

    if kept.is_empty() && words.len() == 1 {
        return words[0].to_string();
    }
    kept.join(" ")
}

fn looks_like_prose(raw: &str) -> bool {
    !RE_DELIMS.is_match(raw) && raw.split_whitespace().count() > PROSE_WORD_LIMIT
}

/// Split a raw interest field into clean atomic tags.
///
/// "gaming, (genshin impact), reading!!" -> ["gaming", "genshin impact", "reading"].
/// Fragments that clean down to nothing or a single character are dropped.
pub fn tokenize_interest_field(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() || looks_like_prose(raw) {
        return Vec::new();
    }

    let comma_joined = RE_AND_WORD.replace_all(raw, ",");

    RE_DELIMS
        .split(&comma_joined)
        .map(clean_interest_token)
        .filter(|token| token.chars().count() > 1)
        .collect()
}
