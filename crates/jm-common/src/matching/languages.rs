use std::collections::HashMap;

use crate::{
    normalize::normalize_key,
    schema::{Language, LanguageLevel},
};

/// Credit when the candidate is exactly one level short.
pub const ONE_LEVEL_SHORT_CREDIT: f64 = 0.5;
/// Credit when the requirement has a level but the candidate's is unknown.
pub const UNKNOWN_LEVEL_CREDIT: f64 = 0.5;

/// Credit (0.0..=1.0) one requirement earns from the candidate's level.
pub fn level_credit(candidate: Option<LanguageLevel>, required: Option<LanguageLevel>) -> f64 {
    let Some(required) = required else {
        return 1.0;
    };
    let Some(candidate) = candidate else {
        return UNKNOWN_LEVEL_CREDIT;
    };

    match required.ordinal() - candidate.ordinal() {
        gap if gap <= 0 => 1.0,
        1 => ONE_LEVEL_SHORT_CREDIT,
        _ => 0.0,
    }
}

/// Sum of per-requirement credits over the number of required languages.
///
/// A language the candidate does not list earns nothing; no requirements → 100.
pub fn score_languages(candidate: &[Language], required: &[Language]) -> f64 {
    let mut requirements: Vec<(String, Option<LanguageLevel>)> = Vec::new();
    for lang in required {
        if let Some(key) = normalize_key(&lang.name) {
            if !requirements.iter().any(|(existing, _)| *existing == key) {
                requirements.push((key, lang.level));
            }
        }
    }
    if requirements.is_empty() {
        return 100.0;
    }

    let mut spoken: HashMap<String, Option<LanguageLevel>> = HashMap::new();
    for lang in candidate {
        if let Some(key) = normalize_key(&lang.name) {
            spoken.entry(key).or_insert(lang.level);
        }
    }

    let earned: f64 = requirements
        .iter()
        .map(|(key, level)| match spoken.get(key) {
            Some(have) => level_credit(*have, *level),
            None => 0.0,
        })
        .sum();

    earned / requirements.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(name: &str, level: Option<LanguageLevel>) -> Language {
        Language {
            name: name.into(),
            level,
        }
    }

    #[test]
    fn exact_level_is_full_credit() {
        let candidate = [lang("English", Some(LanguageLevel::B2))];
        assert_eq!(
            score_languages(&candidate, &[lang("english", Some(LanguageLevel::B2))]),
            100.0
        );
    }

    #[test]
    fn one_level_short_is_half_credit() {
        let candidate = [lang("English", Some(LanguageLevel::B2))];
        assert_eq!(
            score_languages(&candidate, &[lang("English", Some(LanguageLevel::C1))]),
            50.0
        );
    }

    #[test]
    fn two_levels_short_is_no_credit() {
        let candidate = [lang("English", Some(LanguageLevel::B2))];
        assert_eq!(
            score_languages(&candidate, &[lang("English", Some(LanguageLevel::C2))]),
            0.0
        );
    }

    #[test]
    fn native_exceeds_any_cefr_requirement() {
        assert_eq!(level_credit(Some(LanguageLevel::Native), Some(LanguageLevel::C2)), 1.0);
        assert_eq!(level_credit(Some(LanguageLevel::C2), Some(LanguageLevel::Native)), 0.5);
    }

    #[test]
    fn requirement_without_level_accepts_presence() {
        let candidate = [lang("Ukrainian", None)];
        assert_eq!(score_languages(&candidate, &[lang("Ukrainian", None)]), 100.0);
        assert_eq!(level_credit(None, Some(LanguageLevel::B1)), UNKNOWN_LEVEL_CREDIT);
    }

    #[test]
    fn averages_over_requirements() {
        let candidate = [
            lang("English", Some(LanguageLevel::B2)),
            lang("Polish", Some(LanguageLevel::A2)),
        ];
        let required = [
            lang("English", Some(LanguageLevel::B2)),
            lang("German", Some(LanguageLevel::B1)),
            lang("Polish", Some(LanguageLevel::B1)),
            lang("ENGLISH", Some(LanguageLevel::C2)),
        ];
        // English 1.0, German 0.0, Polish 0.5; the duplicate English is ignored
        assert!((score_languages(&candidate, &required) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn no_requirements_is_full_score() {
        assert_eq!(score_languages(&[], &[]), 100.0);
    }
}
