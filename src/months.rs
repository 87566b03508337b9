// Detection of the columns holding one month of payments each.
use crate::types::MonthColumn;
use crate::util::{parse_date_safe, DateOrder};
use chrono::Datelike;

/// Three-letter month abbreviations in English and Indonesian spellings.
pub const MONTH_TOKENS: &[&str] = &[
    "jan", "feb", "mar", "apr", "mei", "may", "jun", "jul", "agu", "aug", "sep", "okt", "oct",
    "nov", "des", "dec",
];

/// Ambiguous numeric header dates are read day-first.
pub const HEADER_DATE_ORDER: DateOrder = DateOrder::DayFirst;

/// Whether a single header names a monthly payment column.
///
/// A header qualifies when it contains a month abbreviation anywhere, or
/// when it parses as a calendar date (a bare year reads as January).
/// Anything else, such as the yearly total `TOTAL 2024`, is excluded.
pub fn is_month_column(header: &str) -> bool {
    let col = header.trim().to_lowercase();
    if MONTH_TOKENS.iter().any(|m| col.contains(m)) {
        return true;
    }
    parse_date_safe(Some(&col), HEADER_DATE_ORDER)
        .map(|d| (1..=12).contains(&d.month()))
        .unwrap_or(false)
}

/// The monthly payment columns of a schema, in their original order.
pub fn detect_month_columns(headers: &[String]) -> Vec<MonthColumn> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_month_column(h))
        .map(|(index, h)| MonthColumn {
            index,
            header: h.clone(),
        })
        .collect()
}
