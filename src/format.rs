//! pt-BR display formatting for the dashboard (`1.234`, `R$ 1.234,56`,
//! `19/10/2026 14:03:00`).

use chrono::{DateTime, FixedOffset, Utc};

/// Brasília time; no daylight saving since 2019.
const BRT_OFFSET_SECS: i32 = 3 * 3600;

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn format_integer(n: u64) -> String {
    group_thousands(n)
}

/// Two decimals, rounded half away from zero.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "R$ 0,00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}R$ {},{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    const PATTERN: &str = "%d/%m/%Y %H:%M:%S";
    match FixedOffset::west_opt(BRT_OFFSET_SECS) {
        Some(brt) => ts.with_timezone(&brt).format(PATTERN).to_string(),
        None => ts.format(PATTERN).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_group_with_dots() {
        assert_eq!(format_integer(0), "0");
        assert_eq!(format_integer(999), "999");
        assert_eq!(format_integer(1234), "1.234");
        assert_eq!(format_integer(1_234_567), "1.234.567");
    }

    #[test]
    fn currency_uses_comma_decimals() {
        assert_eq!(format_currency(414.96), "R$ 414,96");
        assert_eq!(format_currency(1234.5), "R$ 1.234,50");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(-1.0), "-R$ 1,00");
        assert_eq!(format_currency(f64::NAN), "R$ 0,00");
    }

    #[test]
    fn timestamps_render_in_brasilia_time() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(ts), "01/06/2025 12:04:05");
    }
}
