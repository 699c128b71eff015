use strum::AsRefStr;

use crate::{normalize::normalize_keys, schema::LocationPreferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LocationRule {
    RemoteVacancy,
    CandidateRejectsBoth,
    Relocation,
    Unknown,
    CityOverlap,
    CountryOverlap,
    NoOverlap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvaluation {
    pub rule: LocationRule,
    pub score: f64, // 0.0..=100.0
    pub details: String,
}

impl LocationEvaluation {
    fn new(rule: LocationRule, score: f64, details: impl Into<String>) -> Self {
        Self {
            rule,
            score,
            details: details.into(),
        }
    }
}

/// Location decision with the rule that produced it.
///
/// Rules are tried in order and the first applicable one wins.
pub fn evaluate_location(
    candidate: &LocationPreferences,
    vacancy: &LocationPreferences,
) -> LocationEvaluation {
    // 1. fully remote vacancy, candidate works remotely
    if vacancy.is_remote_only() && candidate.is_remote == Some(true) {
        return LocationEvaluation::new(
            LocationRule::RemoteVacancy,
            100.0,
            "remote vacancy, candidate accepts remote",
        );
    }

    // 2. contradictory candidate: refuses remote and office
    if candidate.is_remote == Some(false) && candidate.is_office == Some(false) {
        return LocationEvaluation::new(
            LocationRule::CandidateRejectsBoth,
            0.0,
            "candidate rejects both remote and office work",
        );
    }

    // 3. relocation resolves a place mismatch, at partial credit
    if candidate.willing_to_relocate == Some(true) {
        return LocationEvaluation::new(
            LocationRule::Relocation,
            70.0,
            "candidate willing to relocate",
        );
    }

    if !candidate.has_places() && !vacancy.has_places() {
        return LocationEvaluation::new(
            LocationRule::Unknown,
            50.0,
            "no countries or cities on either side",
        );
    }

    let candidate_cities = normalize_keys(&candidate.cities);
    let vacancy_cities = normalize_keys(&vacancy.cities);
    if let Some(city) = candidate_cities.intersection(&vacancy_cities).next() {
        return LocationEvaluation::new(
            LocationRule::CityOverlap,
            100.0,
            format!("city match: {city}"),
        );
    }

    let candidate_countries = normalize_keys(&candidate.countries);
    let vacancy_countries = normalize_keys(&vacancy.countries);
    if let Some(country) = candidate_countries.intersection(&vacancy_countries).next() {
        return LocationEvaluation::new(
            LocationRule::CountryOverlap,
            70.0,
            format!("country match without city: {country}"),
        );
    }

    LocationEvaluation::new(LocationRule::NoOverlap, 0.0, "no shared city or country")
}

pub fn score_location(candidate: &LocationPreferences, vacancy: &LocationPreferences) -> f64 {
    evaluate_location(candidate, vacancy).score
}
