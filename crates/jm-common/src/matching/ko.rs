/// Outcome of one prefilter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KoDecision {
    /// Disqualifying mismatch; the vacancy is not scored.
    HardKo { reason: String },
    /// Data missing or ambiguous; keep the vacancy and let the scorers decide.
    SoftKo { reason: String },
    Pass,
}

impl KoDecision {
    pub fn hard(reason: impl Into<String>) -> Self {
        KoDecision::HardKo {
            reason: reason.into(),
        }
    }

    pub fn soft(reason: impl Into<String>) -> Self {
        KoDecision::SoftKo {
            reason: reason.into(),
        }
    }

    pub fn is_hard_ko(&self) -> bool {
        matches!(self, KoDecision::HardKo { .. })
    }

    pub fn is_soft_ko(&self) -> bool {
        matches!(self, KoDecision::SoftKo { .. })
    }

    /// `None` for `Pass`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            KoDecision::HardKo { reason } | KoDecision::SoftKo { reason } => Some(reason),
            KoDecision::Pass => None,
        }
    }
}

/// All prefilter decisions for one (vacancy, candidate) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnockoutResult {
    pub is_hard_knockout: bool,
    pub has_unknowns: bool,
    /// (check name, decision)
    pub decisions: Vec<(&'static str, KoDecision)>,
}

impl KnockoutResult {
    pub fn new(decisions: Vec<(&'static str, KoDecision)>) -> Self {
        let is_hard_knockout = decisions.iter().any(|(_, d)| d.is_hard_ko());
        let has_unknowns = decisions.iter().any(|(_, d)| d.is_soft_ko());

        Self {
            is_hard_knockout,
            has_unknowns,
            decisions,
        }
    }

    /// "name: reason" for every hard knockout, joined with `; `.
    pub fn hard_reasons(&self) -> Option<String> {
        let reasons: Vec<_> = self
            .decisions
            .iter()
            .filter(|(_, d)| d.is_hard_ko())
            .filter_map(|(name, d)| d.reason().map(|r| format!("{name}: {r}")))
            .collect();

        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}
