use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{currency::to_reference, schema::SalaryRange};

/// Score when either side's currency cannot be converted.
pub const UNCONVERTIBLE_SCORE: f64 = 50.0;

/// Interval in reference units, `low <= high`.
fn reference_interval(range: &SalaryRange) -> Option<(Decimal, Decimal)> {
    let (low, high) = range.bounds()?;
    let currency = range.currency.as_deref();
    Some((
        to_reference(Some(low), currency)?,
        to_reference(Some(high), currency)?,
    ))
}

/// Salary dimension: overlap of the two ranges over their union, after
/// converting both to the reference currency.
///
/// Either side fully unspecified → 100; unconvertible currency → 50;
/// disjoint → 0; identical point ranges → 100.
pub fn score_salary(candidate: &SalaryRange, vacancy: &SalaryRange) -> f64 {
    if candidate.is_unspecified() || vacancy.is_unspecified() {
        return 100.0;
    }

    let (Some((cv_min, cv_max)), Some((vac_min, vac_max))) =
        (reference_interval(candidate), reference_interval(vacancy))
    else {
        return UNCONVERTIBLE_SCORE;
    };

    let overlap = cv_max.min(vac_max) - cv_min.max(vac_min);
    if overlap < Decimal::ZERO {
        return 0.0;
    }

    let union = cv_max.max(vac_max) - cv_min.min(vac_min);
    if union <= Decimal::ZERO {
        return 100.0;
    }

    (overlap / union * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}
