use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const COMPACT_UNITS: [(f64, &str); 4] = [
    (1_000_000_000_000.0, "T"),
    (1_000_000_000.0, "B"),
    (1_000_000.0, "M"),
    (1_000.0, "K"),
];

/// US-dollar amount with thousands separators and two decimals, e.g. `$67,012.50`.
pub fn format_currency(v: f64) -> String {
    let sign = if v < 0.0 && format!("{:.2}", v.abs()) != "0.00" { "-" } else { "" };
    format!("{}${}", sign, add_commas(&format!("{:.2}", v.abs())))
}

/// Compact magnitude with at most two fraction digits, e.g. `1.32T`, `450.1M`, `999`.
pub fn format_compact(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let abs = v.abs();

    for (i, (scale, suffix)) in COMPACT_UNITS.iter().enumerate() {
        if abs >= *scale {
            let scaled = round2(abs / scale);
            // 999.999K rounds to 1000K; promote it to the next unit
            if scaled >= 1000.0 && i > 0 {
                let (up_scale, up_suffix) = COMPACT_UNITS[i - 1];
                return format!("{}{}{}", sign, trim_fraction(round2(abs / up_scale)), up_suffix);
            }
            return format!("{}{}{}", sign, trim_fraction(scaled), suffix);
        }
    }

    let rounded = round2(abs);
    if rounded >= 1000.0 {
        return format!("{}1K", sign);
    }
    format!("{}{}", sign, trim_fraction(rounded))
}

/// Signed percentage with two decimals, `—` when the value is unknown.
pub fn format_pct(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("{:.2}%", p),
        None => "\u{2014}".to_string(),
    }
}

/// Two-digit 12-hour clock time, e.g. `02:05 PM`.
pub fn format_time<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.format("%I:%M %p").to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn trim_fraction(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn add_commas(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let int_part = parts[0];
    let mut result = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 && c != '-' {
            result.push(',');
        }
        result.push(c);
    }
    let int_formatted: String = result.chars().rev().collect();
    if parts.len() > 1 {
        format!("{}.{}", int_formatted, parts[1])
    } else {
        int_formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn currency() {
        assert_eq!(format_currency(67012.5), "$67,012.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.999), "$1.00");
        assert_eq!(format_currency(0.0000123), "$0.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn compact() {
        assert_eq!(format_compact(1_320_000_000_000.0), "1.32T");
        assert_eq!(format_compact(450_100_000.0), "450.1M");
        assert_eq!(format_compact(21_000_000_000.0), "21B");
        assert_eq!(format_compact(1_500.0), "1.5K");
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(12.346), "12.35");
        assert_eq!(format_compact(0.0), "0");
        assert_eq!(format_compact(-2_500_000.0), "-2.5M");
    }

    #[test]
    fn compact_promotes_rounded_overflow() {
        assert_eq!(format_compact(999_999.0), "1M");
        assert_eq!(format_compact(999.999), "1K");
    }

    #[test]
    fn pct() {
        assert_eq!(format_pct(Some(4.567)), "4.57%");
        assert_eq!(format_pct(Some(-0.5)), "-0.50%");
        assert_eq!(format_pct(None), "\u{2014}");
    }

    #[test]
    fn time_of_day() {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_time(&t), "02:05 PM");
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 0, 30, 0).unwrap();
        assert_eq!(format_time(&t), "12:30 AM");
    }
}
