//! Static currency table and salary text parsing.
//!
//! Amounts are converted to the reference unit (USD) by multiplying with the
//! rate of their currency. Unknown currencies are "unconvertible" (`None`),
//! never zero.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::schema::SalaryRange;

/// Reference unit every rate converts into.
pub const REFERENCE_CURRENCY: &str = "USD";

/// (code, rate-to-USD). `amount * rate` = reference units.
const RATES: &[(&str, Decimal)] = &[
    ("USD", Decimal::from_parts(100, 0, 0, false, 2)),
    ("EUR", Decimal::from_parts(108, 0, 0, false, 2)),
    ("GBP", Decimal::from_parts(127, 0, 0, false, 2)),
    ("CHF", Decimal::from_parts(113, 0, 0, false, 2)),
    ("CAD", Decimal::from_parts(73, 0, 0, false, 2)),
    ("PLN", Decimal::from_parts(25, 0, 0, false, 2)),
    ("UAH", Decimal::from_parts(27, 0, 0, false, 3)),
];

const ALIASES: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₴", "UAH"),
    ("грн", "UAH"),
    ("zł", "PLN"),
];

/// Resolves a currency code or symbol to its canonical ISO code.
pub fn canonical_code(code: &str) -> Option<&'static str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_uppercase();
    if let Some((known, _)) = RATES.iter().find(|(known, _)| *known == upper) {
        return Some(*known);
    }

    let lower = trimmed.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| *canonical)
}

/// Rate of `code` against the reference unit.
pub fn rate_for(code: &str) -> Option<Decimal> {
    let canonical = canonical_code(code)?;
    RATES
        .iter()
        .find(|(known, _)| *known == canonical)
        .map(|(_, rate)| *rate)
}

/// Converts an amount into reference units.
///
/// `None` when the amount or the code is missing, or the code is not in the
/// table.
pub fn to_reference(amount: Option<i64>, currency_code: Option<&str>) -> Option<Decimal> {
    let amount = amount?;
    let rate = rate_for(currency_code?)?;
    Decimal::from(amount).checked_mul(rate)
}

static RE_SALARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?P<min>\d[\d\s_']*)
        (?:\s*[-–—]\s*(?P<max>\d[\d\s_']*))?
        \s*(?P<currency>[^\d\s]+)?
        \s*$",
    )
    .expect("salary regex is valid")
});

fn parse_amount(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parses the free-text salary form used by the extraction prompts:
/// `"50000-70000 UAH"`, `"60000 EUR"`, `"1 500 - 2 000 $"`.
///
/// Text that does not look like a range ("Negotiable") yields an
/// unspecified range.
pub fn parse_salary_range(text: &str) -> SalaryRange {
    let Some(caps) = RE_SALARY.captures(text) else {
        return SalaryRange::default();
    };

    let min = caps.name("min").and_then(|m| parse_amount(m.as_str()));
    let max = caps
        .name("max")
        .and_then(|m| parse_amount(m.as_str()))
        .or(min);
    let currency = caps
        .name("currency")
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty());

    SalaryRange { min, max, currency }
}
