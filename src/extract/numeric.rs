// src/extract/numeric.rs
//! Brazilian-locale number parsing (`1.234,56`, `R$ 414,96`).
//!
//! Everything here is fail-soft: a missing or malformed numeral yields zero.

use once_cell::sync::Lazy;
use regex::Regex;

/// What kind of value a captured numeral represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Currency,
}

pub(crate) static RE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digits regex"));

/// Digits optionally grouped with `.`, at most one `,` fraction group.
static RE_BR_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d.]*(?:,\d+)?").expect("br numeral regex"));

/// Parse `text` according to `kind`. Integers are returned as `f64` here;
/// use [`parse_integer`] when the integral type matters.
pub fn parse_locale_number(text: &str, kind: NumberKind) -> f64 {
    match kind {
        NumberKind::Integer => parse_integer(text) as f64,
        NumberKind::Currency => parse_currency(text),
    }
}

/// First run of decimal digits, base 10. No digits → 0.
/// Runs too long for `u64` saturate.
pub fn parse_integer(text: &str) -> u64 {
    let Some(m) = RE_DIGITS.find(text) else {
        return 0;
    };
    m.as_str().parse::<u64>().unwrap_or(u64::MAX)
}

/// First Brazilian numeral in `text`: `.` thousands separators dropped,
/// `,` becomes the decimal point. No numeral → 0.0.
pub fn parse_currency(text: &str) -> f64 {
    let Some(m) = RE_BR_NUMERAL.find(text) else {
        return 0.0;
    };
    let canonical = m.as_str().replace('.', "").replace(',', ".");
    canonical.parse::<f64>().unwrap_or(0.0)
}
