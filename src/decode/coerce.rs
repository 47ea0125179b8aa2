//! Value coercion
//!
//! Blank or unparsable input is always `None`; nothing is defaulted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

fn clean_number(value: &str) -> Option<String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse a float, ignoring thousands separators
pub fn parse_float(value: &str) -> Option<f64> {
    clean_number(value)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Parse a number and truncate it to a whole value
pub fn parse_int(value: &str) -> Option<i64> {
    let n = parse_float(value)?.trunc();
    if n < i64::MIN as f64 || n > i64::MAX as f64 {
        return None;
    }
    Some(n as i64)
}

/// Parse a date, accepting an optional time of day
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod coerce_tests {
    use super::*;
    use test_case::test_case;

    #[test_case("450000", Some(450_000) ; "plain")]
    #[test_case("1,250,000", Some(1_250_000) ; "thousands separators")]
    #[test_case("2.9", Some(2) ; "truncated")]
    #[test_case(" 3 ", Some(3) ; "padded")]
    #[test_case("$525,000.00", Some(525_000) ; "currency")]
    #[test_case("", None ; "blank")]
    #[test_case("n/a", None ; "garbage")]
    fn test_parse_int(input: &str, expected: Option<i64>) {
        assert_eq!(parse_int(input), expected);
    }

    #[test_case("2.5", Some(2.5) ; "decimal")]
    #[test_case("1,234.75", Some(1234.75) ; "thousands separators")]
    #[test_case("   ", None ; "blank")]
    #[test_case("NaN", None ; "not finite")]
    fn test_parse_float(input: &str, expected: Option<f64>) {
        assert_eq!(parse_float(input), expected);
    }

    #[test_case("2024-03-15" ; "iso date")]
    #[test_case("03/15/2024" ; "us date")]
    #[test_case("2024-03-15 10:30:00" ; "iso with time")]
    #[test_case("2024-03-15T10:30:00" ; "iso t form")]
    #[test_case("2024-03-15T10:30:00.250" ; "fractional seconds")]
    #[test_case("03/15/2024 10:30" ; "us with time")]
    #[test_case("03/15/2024 10:30:00 AM" ; "us twelve hour")]
    #[test_case("2024-03-15T10:30:00-05:00" ; "offset")]
    fn test_parse_date_formats(input: &str) {
        assert_eq!(
            parse_date(input),
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_rejects_unknown() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("15.03.2024"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(283.333_333), 283.33);
        assert_eq!(round2(100.0), 100.0);
    }
}
