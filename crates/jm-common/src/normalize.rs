use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,;.]+").expect("separator regex is valid"));

fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    RE_SEPARATORS
        .split(text)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Free text → lowercase token set.
///
/// Splits on any run of whitespace, commas, semicolons or periods and drops
/// empty tokens. `None` yields an empty set.
pub fn normalize_text(text: Option<&str>) -> BTreeSet<String> {
    match text {
        Some(text) => tokens(&fold(text)).collect(),
        None => BTreeSet::new(),
    }
}

/// Union of the token sets of every tag (`["Machine Learning", "SQL"]` →
/// `{machine, learning, sql}`).
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter()
        .flat_map(|tag| normalize_text(Some(tag)))
        .collect()
}

/// Canonical form of a whole phrase: tokens re-joined by a single space.
///
/// Returns `None` when nothing but separators remain.
pub fn normalize_phrase(text: &str) -> Option<String> {
    let folded = fold(text);
    let joined = tokens(&folded).collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Distinct normalized phrases, first occurrence order kept.
pub fn normalize_phrases(phrases: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    phrases
        .iter()
        .filter_map(|phrase| normalize_phrase(phrase))
        .filter(|phrase| seen.insert(phrase.clone()))
        .collect()
}

/// Comparison key for names (languages, cities, countries).
pub fn normalize_key(text: &str) -> Option<String> {
    let folded = fold(text);
    let key = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Normalized key set for a list of names; blanks are dropped.
pub fn normalize_keys(values: &[String]) -> BTreeSet<String> {
    values.iter().filter_map(|v| normalize_key(v)).collect()
}
