use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::debug;

use super::{
    languages::score_languages,
    level::score_level,
    location::evaluate_location,
    prefilter::PreFilterConfig,
    responsibilities::score_responsibilities,
    salary::score_salary,
    skills::match_tokens,
    weights::{Weights, MATCH_WEIGHTS},
};
use crate::{
    error::ConfigError,
    schema::{CandidateProfile, VacancyRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
pub enum MatchQuality {
    Low,
    Medium,
    High,
}

/// Lower bounds (inclusive) of the Medium and High tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    pub medium: f64,
    pub high: f64,
}

pub const QUALITY_THRESHOLDS: QualityThresholds = QualityThresholds {
    medium: 50.0,
    high: 80.0,
};

impl Default for QualityThresholds {
    fn default() -> Self {
        QUALITY_THRESHOLDS
    }
}

impl QualityThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.medium.is_finite()
            && self.high.is_finite()
            && 0.0 <= self.medium
            && self.medium <= self.high
            && self.high <= 100.0;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::InvertedThresholds {
                medium: self.medium,
                high: self.high,
            })
        }
    }

    pub fn classify(&self, overall: f64) -> MatchQuality {
        if overall >= self.high {
            MatchQuality::High
        } else if overall >= self.medium {
            MatchQuality::Medium
        } else {
            MatchQuality::Low
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub weights: Weights,
    pub thresholds: QualityThresholds,
    pub prefilter: PreFilterConfig,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: MATCH_WEIGHTS,
            thresholds: QUALITY_THRESHOLDS,
            prefilter: PreFilterConfig::default(),
        }
    }
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
    }
}

impl MatchingConfig {
    /// Checks weights, thresholds and prefilter settings together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.prefilter.validate()
    }

    /// Defaults with `JM_QUALITY_HIGH`, `JM_QUALITY_MEDIUM`,
    /// `JM_PREFILTER_SALARY_TOLERANCE` and `JM_PREFILTER_REQUIRE_CATEGORY`
    /// applied. Weights are fixed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(high) = parse_override(&lookup, "JM_QUALITY_HIGH")? {
            config.thresholds.high = high;
        }
        if let Some(medium) = parse_override(&lookup, "JM_QUALITY_MEDIUM")? {
            config.thresholds.medium = medium;
        }
        if let Some(tolerance) = parse_override(&lookup, "JM_PREFILTER_SALARY_TOLERANCE")? {
            config.prefilter.salary_tolerance = tolerance;
        }
        if let Some(require) = parse_override(&lookup, "JM_PREFILTER_REQUIRE_CATEGORY")? {
            config.prefilter.require_category = require;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Raw (unrounded) per-dimension scores, each in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionScores {
    pub skills: f64,
    pub tools: f64,
    pub responsibilities: f64,
    pub languages: f64,
    pub location: f64,
    pub salary: f64,
    pub level: f64,
}

impl DimensionScores {
    /// Runs all seven scorers for one pair.
    pub fn compute(candidate: &CandidateProfile, vacancy: &VacancyRecord) -> Self {
        let skills = match_tokens(&candidate.skills, &vacancy.required_skills);
        let tools = match_tokens(&candidate.tools, &vacancy.required_tools);
        let location = evaluate_location(&candidate.location, &vacancy.location);
        debug!(
            missing_skills = ?skills.missing,
            missing_tools = ?tools.missing,
            location_rule = location.rule.as_ref(),
            location = %location.details,
            "dimension details"
        );

        Self {
            skills: skills.score(),
            tools: tools.score(),
            responsibilities: score_responsibilities(
                &candidate.responsibilities,
                &vacancy.responsibilities,
            ),
            languages: score_languages(&candidate.languages, &vacancy.required_languages),
            location: location.score,
            salary: score_salary(&candidate.salary_expectation, &vacancy.salary_offer),
            level: score_level(
                candidate.seniority_level.as_deref(),
                vacancy.seniority_level.as_deref(),
            ),
        }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            skills: f(self.skills),
            tools: f(self.tools),
            responsibilities: f(self.responsibilities),
            languages: f(self.languages),
            location: f(self.location),
            salary: f(self.salary),
            level: f(self.level),
        }
    }

    pub fn clamped(self) -> Self {
        self.map(clamp_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub overall: f64,
    pub quality: MatchQuality,
}

/// Weighted sum of the dimension scores plus its quality tier.
pub fn aggregate(
    scores: &DimensionScores,
    weights: &Weights,
    thresholds: &QualityThresholds,
) -> Aggregate {
    let s = scores.clamped();
    let overall = clamp_score(
        s.skills * weights.skills
            + s.tools * weights.tools
            + s.responsibilities * weights.responsibilities
            + s.languages * weights.languages
            + s.location * weights.location
            + s.salary * weights.salary
            + s.level * weights.level,
    );

    Aggregate {
        overall,
        quality: thresholds.classify(overall),
    }
}

/// NaN collapses to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Engine output for one (candidate, vacancy) pair. Scores are clamped to
/// 0..=100 and rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall_score: f64,
    pub quality: MatchQuality,
    pub skills_score: f64,
    pub tools_score: f64,
    pub responsibilities_score: f64,
    pub languages_score: f64,
    pub location_score: f64,
    pub salary_score: f64,
    pub level_score: f64,
}

impl MatchResult {
    /// Rounds at the boundary. Quality is classified from the rounded overall.
    pub fn from_scores(
        scores: &DimensionScores,
        weights: &Weights,
        thresholds: &QualityThresholds,
    ) -> Self {
        let aggregate = aggregate(scores, weights, thresholds);
        let overall_score = round2(aggregate.overall);
        let rounded = scores.clamped().map(round2);

        Self {
            overall_score,
            quality: thresholds.classify(overall_score),
            skills_score: rounded.skills,
            tools_score: rounded.tools,
            responsibilities_score: rounded.responsibilities,
            languages_score: rounded.languages,
            location_score: rounded.location,
            salary_score: rounded.salary,
            level_score: rounded.level,
        }
    }
}
