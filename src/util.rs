// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" spreadsheet handling (numbers typed as
// text, dates in several layouts) so the calculators can work on typed
// values and collapse failures to their own defaults.
use chrono::{Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Which reading wins when a numeric date like `03/04/2024` is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

/// Textual layouts with month names, tried after the numeric forms.
const NAMED_DATE_FORMATS: &[&str] = &["%d %b %Y", "%d-%b-%Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`nan`, `inf`, `n/a`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date written in one of the layouts found in tax workbooks.
///
/// Numeric dates are split on `/`, `-` or `.`; a trailing time part
/// (`2024-01-01 00:00:00`) is ignored. Month-year forms (`01/2024`,
/// `2024-01`) resolve to the first of the month, and a bare four-digit
/// year (`2024`) to the first of January.
pub fn parse_date_safe(s: Option<&str>, order: DateOrder) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    parse_numeric_date(date_part, order).or_else(|| {
        NAMED_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    })
}

fn parse_numeric_date(s: &str, order: DateOrder) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let num = |p: &str| p.parse::<u32>().ok();

    match parts.as_slice() {
        [y] if y.len() == 4 => NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1),
        [y, m, d] if y.len() == 4 => NaiveDate::from_ymd_opt(y.parse().ok()?, num(*m)?, num(*d)?),
        [a, b, y] if y.len() == 4 || y.len() == 2 => {
            let year = expand_year(y)?;
            let (a, b) = (num(*a)?, num(*b)?);
            let (first, second) = match order {
                DateOrder::DayFirst => ((b, a), (a, b)),
                DateOrder::MonthFirst => ((a, b), (b, a)),
            };
            NaiveDate::from_ymd_opt(year, first.0, first.1)
                .or_else(|| NaiveDate::from_ymd_opt(year, second.0, second.1))
        }
        [y, m] if y.len() == 4 && m.len() <= 2 => NaiveDate::from_ymd_opt(y.parse().ok()?, num(*m)?, 1),
        [m, y] if y.len() == 4 && m.len() <= 2 => NaiveDate::from_ymd_opt(y.parse().ok()?, num(*m)?, 1),
        _ => None,
    }
}

/// Four-digit years as-is; two-digit years pivot at 69 like `strptime`'s `%y`.
fn expand_year(y: &str) -> Option<i32> {
    let v: i32 = y.parse().ok()?;
    match y.len() {
        4 => Some(v),
        2 if v < 69 => Some(2000 + v),
        2 => Some(1900 + v),
        _ => None,
    }
}

/// Convert an Excel serial day number (1900 date system) to a date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let secs = ((serial.fract()) * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn amounts_are_forgiving() {
        assert_eq!(parse_f64_safe(Some(" 1,500.50 ")), Some(1500.5));
        assert_eq!(parse_f64_safe(Some("150")), Some(150.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn ambiguous_dates_follow_order() {
        assert_eq!(parse_date_safe(Some("03/04/2024"), DateOrder::DayFirst), Some(ymd(2024, 4, 3)));
        assert_eq!(parse_date_safe(Some("03/04/2024"), DateOrder::MonthFirst), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn impossible_reading_falls_back() {
        assert_eq!(parse_date_safe(Some("12/25/2024"), DateOrder::DayFirst), Some(ymd(2024, 12, 25)));
        assert_eq!(parse_date_safe(Some("25/12/2024"), DateOrder::MonthFirst), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn iso_and_month_year_forms() {
        assert_eq!(parse_date_safe(Some("2024-03-01 00:00:00"), DateOrder::DayFirst), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date_safe(Some("01/2024"), DateOrder::DayFirst), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date_safe(Some("2024-11"), DateOrder::DayFirst), Some(ymd(2024, 11, 1)));
        assert_eq!(parse_date_safe(Some("1/1/24"), DateOrder::DayFirst), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn non_dates_are_rejected() {
        for s in ["total 2024", "13/13/2024", "upppd", "1-2", "45", "202401"] {
            assert_eq!(parse_date_safe(Some(s), DateOrder::DayFirst), None, "{s}");
        }
    }

    #[test]
    fn bare_year_is_first_of_january() {
        assert_eq!(parse_date_safe(Some("2024"), DateOrder::DayFirst), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date_safe(Some(" 2019 "), DateOrder::MonthFirst), Some(ymd(2019, 1, 1)));
    }

    #[test]
    fn named_month_dates() {
        assert_eq!(parse_date_safe(Some("1 Mar 2024"), DateOrder::MonthFirst), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn excel_serials() {
        let dt = excel_serial_to_datetime(45352.0).unwrap();
        assert_eq!(dt.date(), ymd(2024, 3, 1));
        assert_eq!(excel_serial_to_datetime(-3.0), None);
    }

    #[test]
    fn numbers_get_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-150.0, 1), "-150.0");
    }
}
