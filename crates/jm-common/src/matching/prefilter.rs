use rust_decimal::{prelude::FromPrimitive, Decimal};
use tracing::debug;

use super::ko::{KnockoutResult, KoDecision};
use crate::{
    currency::to_reference,
    error::ConfigError,
    normalize::{normalize_key, normalize_keys},
    schema::{CandidateProfile, SalaryRange, VacancyRecord},
};

#[derive(Debug, Clone, PartialEq)]
pub struct PreFilterConfig {
    /// Fraction the candidate's salary band is widened by on each side
    /// before a disjoint vacancy range is treated as disqualifying.
    pub salary_tolerance: f64,
    /// Drop vacancies whose category is not among the candidate's.
    pub require_category: bool,
}

impl Default for PreFilterConfig {
    fn default() -> Self {
        Self {
            salary_tolerance: 0.2,
            require_category: true,
        }
    }
}

impl PreFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.salary_tolerance.is_finite() && (0.0..=1.0).contains(&self.salary_tolerance) {
            Ok(())
        } else {
            Err(ConfigError::SalaryTolerance(self.salary_tolerance))
        }
    }
}

/// Cheap hard-mismatch filter run before scoring.
///
/// Only rejects on disqualifying mismatches; unknown data is kept as
/// `SoftKo`. Skipping the filter never changes the score of a vacancy that
/// passes it.
#[derive(Debug, Clone, Default)]
pub struct PreFilter {
    config: PreFilterConfig,
}

impl PreFilter {
    pub fn new(config: PreFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreFilterConfig {
        &self.config
    }

    /// Runs every check and keeps all decisions.
    pub fn evaluate(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KnockoutResult {
        KnockoutResult::new(vec![
            ("work_mode", check_work_mode(vacancy, candidate)),
            ("category", self.check_category(vacancy, candidate)),
            ("salary", self.check_salary_band(vacancy, candidate)),
            ("language", check_required_languages(vacancy, candidate)),
        ])
    }

    pub fn is_candidate_pool(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> bool {
        !self.evaluate(vacancy, candidate).is_hard_knockout
    }

    /// Indexes of the vacancies that survive, input order kept.
    pub fn filter(&self, candidate: &CandidateProfile, vacancies: &[VacancyRecord]) -> Vec<usize> {
        vacancies
            .iter()
            .enumerate()
            .filter(|(index, vacancy)| {
                self.admit(*index, vacancy.id, &self.evaluate(vacancy, candidate))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Indexes of the candidates that survive for one vacancy, input order kept.
    pub fn filter_candidates(
        &self,
        vacancy: &VacancyRecord,
        candidates: &[CandidateProfile],
    ) -> Vec<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|(index, candidate)| {
                self.admit(*index, candidate.id, &self.evaluate(vacancy, candidate))
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn admit(&self, index: usize, id: Option<i64>, verdict: &KnockoutResult) -> bool {
        if let Some(reasons) = verdict.hard_reasons() {
            debug!(index, id, %reasons, "filtered out");
        } else if verdict.has_unknowns {
            debug!(index, id, "kept with unknown data");
        }
        !verdict.is_hard_knockout
    }

    fn check_category(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KoDecision {
        if !self.config.require_category {
            return KoDecision::Pass;
        }

        let wanted = normalize_keys(&candidate.categories);
        let offered = vacancy.category.as_deref().and_then(normalize_key);
        match offered {
            None => KoDecision::soft("category_unknown: vacancy has no category"),
            Some(_) if wanted.is_empty() => {
                KoDecision::soft("category_unknown: candidate has no categories")
            }
            Some(category) if wanted.contains(&category) => KoDecision::Pass,
            Some(category) => KoDecision::hard(format!(
                "category_mismatch: vacancy={category}, candidate={}",
                wanted.into_iter().collect::<Vec<_>>().join(", ")
            )),
        }
    }

    fn check_salary_band(&self, vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KoDecision {
        let (Some((cv_low, cv_high)), Some((vac_low, vac_high))) = (
            reference_bounds(&candidate.salary_expectation),
            reference_bounds(&vacancy.salary_offer),
        ) else {
            return KoDecision::soft("salary_unknown: range missing or unconvertible");
        };

        let Some(tolerance) = Decimal::from_f64(self.config.salary_tolerance) else {
            return KoDecision::soft("salary_unknown: tolerance not representable");
        };
        let band_low = cv_low * (Decimal::ONE - tolerance);
        let band_high = cv_high * (Decimal::ONE + tolerance);

        if vac_high < band_low {
            KoDecision::hard(format!(
                "salary_too_low: vacancy max {vac_high} < candidate band {band_low}"
            ))
        } else if vac_low > band_high {
            KoDecision::hard(format!(
                "salary_too_high: vacancy min {vac_low} > candidate band {band_high}"
            ))
        } else {
            KoDecision::Pass
        }
    }
}

/// Prefilter with default settings.
pub fn is_candidate_pool(vacancy: &VacancyRecord, candidate: &CandidateProfile) -> bool {
    PreFilter::default().is_candidate_pool(vacancy, candidate)
}

fn reference_bounds(range: &SalaryRange) -> Option<(Decimal, Decimal)> {
    let (low, high) = range.bounds()?;
    let currency = range.currency.as_deref();
    Some((to_reference(Some(low), currency)?, to_reference(Some(high), currency)?))
}

/// Remote-only candidate against an office-only vacancy.
fn check_work_mode(vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KoDecision {
    let wants = &candidate.location;
    if wants.is_remote.is_none() && wants.is_office.is_none() && wants.is_hybrid.is_none() {
        return KoDecision::soft("work_mode_unknown: candidate states no work mode");
    }

    if wants.is_remote_only() && vacancy.location.is_office_only() {
        KoDecision::hard("work_mode_mismatch: remote-only candidate, office-only vacancy")
    } else {
        KoDecision::Pass
    }
}

/// A listed language two or more levels below the requirement disqualifies.
fn check_required_languages(vacancy: &VacancyRecord, candidate: &CandidateProfile) -> KoDecision {
    let mut unknown = Vec::new();

    for required in &vacancy.required_languages {
        let Some(key) = normalize_key(&required.name) else {
            continue;
        };
        let spoken = candidate
            .languages
            .iter()
            .find(|lang| normalize_key(&lang.name).as_deref() == Some(key.as_str()));

        match (spoken, required.level) {
            (None, _) => unknown.push(key),
            (Some(lang), Some(req_level)) => {
                if let Some(have) = lang.level {
                    if req_level.ordinal() - have.ordinal() >= 2 {
                        return KoDecision::hard(format!(
                            "language_insufficient: {key} {} < required {}",
                            have.as_ref(),
                            req_level.as_ref()
                        ));
                    }
                }
            }
            (Some(_), None) => {}
        }
    }

    if unknown.is_empty() {
        KoDecision::Pass
    } else {
        KoDecision::soft(format!("language_unlisted: {}", unknown.join(", ")))
    }
}
