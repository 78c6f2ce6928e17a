// src/extract/labels.rs
//! Label matcher: decides which metric (if any) a CSV line carries and
//! isolates the raw numeral for the numeric parser.

use once_cell::sync::Lazy;
use regex::Regex;

use super::numeric::{NumberKind, RE_DIGITS};

/// How a label phrase must appear in the normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Prefix,
    Contains,
}

/// The three known metrics. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricLabel {
    TotalLives,
    AmountReceived,
    MonthlyAverage,
}

impl MetricLabel {
    pub const ALL: [MetricLabel; 3] = [
        MetricLabel::TotalLives,
        MetricLabel::AmountReceived,
        MetricLabel::MonthlyAverage,
    ];

    /// Label phrase in normalized form (lower-case, accents folded).
    pub fn phrase(self) -> &'static str {
        match self {
            MetricLabel::TotalLives => "vidas totais vendidas",
            MetricLabel::AmountReceived => "valor recebido",
            MetricLabel::MonthlyAverage => "media mes",
        }
    }

    pub fn match_mode(self) -> MatchMode {
        match self {
            MetricLabel::TotalLives | MetricLabel::AmountReceived => MatchMode::Prefix,
            MetricLabel::MonthlyAverage => MatchMode::Contains,
        }
    }

    pub fn number_kind(self) -> NumberKind {
        match self {
            MetricLabel::TotalLives => NumberKind::Integer,
            MetricLabel::AmountReceived | MetricLabel::MonthlyAverage => NumberKind::Currency,
        }
    }

    fn matches(self, normalized: &str) -> bool {
        match self.match_mode() {
            MatchMode::Prefix => normalized.starts_with(self.phrase()),
            MatchMode::Contains => normalized.contains(self.phrase()),
        }
    }
}

/// Strip quote and tab characters injected by the export, trim whitespace.
/// Case is preserved.
pub fn clean_line(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, '"' | '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lower-case and fold the accented vowels that occur in Portuguese labels.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' => 'a',
        'é' | 'ê' => 'e',
        'í' => 'i',
        'ó' | 'ô' | 'õ' => 'o',
        'ú' => 'u',
        other => other,
    }
}

/// Which metric this line carries, if any. First declared label wins.
pub fn classify_line(line: &str) -> Option<MetricLabel> {
    let normalized = normalize(&clean_line(line));
    MetricLabel::ALL
        .into_iter()
        .find(|label| label.matches(&normalized))
}

static RE_CURRENCY_AFTER_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)R\$\s*(?P<num>\d[\d.]*(?:,\d+)?)").expect("currency marker regex")
});

/// Raw numeral substring for `label` on `line`, or `None` when the line
/// carries the label but no value.
///
/// Label phrases contain no digits, so searching the whole cleaned line is
/// equivalent to searching after the label.
pub fn extract_capture(line: &str, label: MetricLabel) -> Option<String> {
    let cleaned = clean_line(line);
    match label.number_kind() {
        NumberKind::Integer => RE_DIGITS
            .find(&cleaned)
            .map(|m| m.as_str().to_string()),
        NumberKind::Currency => RE_CURRENCY_AFTER_MARKER
            .captures(&cleaned)
            .and_then(|caps| caps.name("num"))
            .map(|m| m.as_str().to_string()),
    }
}
