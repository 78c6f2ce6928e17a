// src/extract/mod.rs
//! Metric extraction from published spreadsheet CSV exports.
//!
//! The exports have no stable column order or header offset, so every line
//! is scanned for a known label instead of reading fixed positions. Parsing
//! is fail-soft: a label that is missing, or present without a readable
//! value, leaves the metric at zero.

pub mod labels;
pub mod numeric;

use serde::{Deserialize, Serialize};

pub use labels::{classify_line, extract_capture, MetricLabel};
pub use numeric::{parse_locale_number, NumberKind};

/// The three metrics read from one export. Zero means "not found" or a real zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetrics {
    pub total_lives_sold: u64,
    pub amount_received: f64,
    pub monthly_average: f64,
}

/// Per-document diagnostics, for logs and counters only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub lines_scanned: usize,
    pub total_lives_matches: usize,
    pub amount_received_matches: usize,
    pub monthly_average_matches: usize,
    /// Lines that carried a label but no readable value.
    pub empty_captures: usize,
}

impl ExtractionReport {
    fn record_match(&mut self, label: MetricLabel) {
        match label {
            MetricLabel::TotalLives => self.total_lives_matches += 1,
            MetricLabel::AmountReceived => self.amount_received_matches += 1,
            MetricLabel::MonthlyAverage => self.monthly_average_matches += 1,
        }
    }

    /// Labels that never matched a line.
    pub fn missing_labels(&self) -> Vec<MetricLabel> {
        let mut out = Vec::new();
        if self.total_lives_matches == 0 {
            out.push(MetricLabel::TotalLives);
        }
        if self.amount_received_matches == 0 {
            out.push(MetricLabel::AmountReceived);
        }
        if self.monthly_average_matches == 0 {
            out.push(MetricLabel::MonthlyAverage);
        }
        out
    }
}

/// Extract the three metrics from a raw CSV document. Never fails.
pub fn extract(raw: &str) -> ExtractedMetrics {
    extract_with_report(raw).0
}

/// Same as [`extract`], plus diagnostics about what matched.
///
/// Lines are scanned in order; when a label appears on several lines the
/// last one with a readable value wins.
pub fn extract_with_report(raw: &str) -> (ExtractedMetrics, ExtractionReport) {
    let mut metrics = ExtractedMetrics::default();
    let mut report = ExtractionReport::default();

    for line in raw.lines() {
        report.lines_scanned += 1;

        let Some(label) = classify_line(line) else {
            continue;
        };
        report.record_match(label);

        let Some(capture) = extract_capture(line, label) else {
            report.empty_captures += 1;
            continue;
        };

        match label {
            MetricLabel::TotalLives => {
                metrics.total_lives_sold = numeric::parse_integer(&capture);
            }
            MetricLabel::AmountReceived => {
                metrics.amount_received = parse_locale_number(&capture, label.number_kind());
            }
            MetricLabel::MonthlyAverage => {
                metrics.monthly_average = parse_locale_number(&capture, label.number_kind());
            }
        }
    }

    (metrics, report)
}
