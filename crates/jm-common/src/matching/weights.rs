use crate::error::ConfigError;

/// Raw share given to seniority on top of the six base dimensions.
const LEVEL_SHARE: f64 = 0.10;
/// Base weights sum to 1.0; adding the level share needs this divisor.
const RENORMALIZER: f64 = 1.0 + LEVEL_SHARE;

/// Tolerance for the weight-sum check.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Canonical weight vector used for every match.
///
/// Base shares: skills 0.25, tools 0.15, responsibilities 0.20,
/// languages 0.15, location 0.15, salary 0.10; seniority adds 0.10 and all
/// seven are divided by 1.10.
pub const MATCH_WEIGHTS: Weights = Weights {
    skills: 0.25 / RENORMALIZER,
    tools: 0.15 / RENORMALIZER,
    responsibilities: 0.20 / RENORMALIZER,
    languages: 0.15 / RENORMALIZER,
    location: 0.15 / RENORMALIZER,
    salary: 0.10 / RENORMALIZER,
    level: LEVEL_SHARE / RENORMALIZER,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub skills: f64,
    pub tools: f64,
    pub responsibilities: f64,
    pub languages: f64,
    pub location: f64,
    pub salary: f64,
    pub level: f64,
}

impl Default for Weights {
    fn default() -> Self {
        MATCH_WEIGHTS
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills
            + self.tools
            + self.responsibilities
            + self.languages
            + self.location
            + self.salary
            + self.level
    }

    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("skills", self.skills),
            ("tools", self.tools),
            ("responsibilities", self.responsibilities),
            ("languages", self.languages),
            ("location", self.location),
            ("salary", self.salary),
            ("level", self.level),
        ]
    }

    /// Every weight finite and non-negative, total 1.0 within tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in self.named() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { name, weight });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert!((MATCH_WEIGHTS.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!(MATCH_WEIGHTS.validate().is_ok());
    }

    #[test]
    fn base_proportions_survive_renormalization() {
        let w = MATCH_WEIGHTS;
        assert!((w.skills / w.tools - 0.25 / 0.15).abs() < 1e-12);
        assert!((w.responsibilities / w.salary - 2.0).abs() < 1e-12);
        assert!((w.level - w.salary).abs() < 1e-12);
    }

    #[test]
    fn rejects_vectors_off_by_more_than_tolerance() {
        let skewed = Weights {
            skills: MATCH_WEIGHTS.skills + 0.01,
            ..MATCH_WEIGHTS
        };
        assert!(matches!(skewed.validate(), Err(ConfigError::WeightSum { .. })));
    }

    #[test]
    fn rejects_negative_weights() {
        let negative = Weights {
            tools: -0.1,
            salary: MATCH_WEIGHTS.salary + MATCH_WEIGHTS.tools + 0.1,
            ..MATCH_WEIGHTS
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::InvalidWeight { name: "tools", .. })
        ));
    }
}
