// Active (tax-liable) months of a unit within a fiscal year.
use crate::types::Cell;
use crate::util::{excel_serial_to_datetime, parse_date_safe, DateOrder};
use chrono::{Datelike, NaiveDate};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Registration dates typed as text are read month-first when ambiguous.
pub const REGISTRATION_DATE_ORDER: DateOrder = DateOrder::MonthFirst;

/// Read the registration date (TMT) out of a cell.
///
/// Date cells are used directly, numbers are Excel serial days, text goes
/// through the forgiving date parser. Anything unreadable is `None`.
pub fn registration_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(dt) => Some(dt.date()),
        Cell::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
        Cell::Text(s) => parse_date_safe(Some(s), REGISTRATION_DATE_ORDER),
        Cell::Empty => None,
    }
}

/// Months in `fiscal_year` during which a unit registered on
/// `registration` owed tax.
///
/// Registered in an earlier year: all 12. Registered during the fiscal
/// year: from the registration month through December. Registered later,
/// or no date at all: 0.
pub fn active_months(registration: Option<NaiveDate>, fiscal_year: i32) -> u32 {
    let Some(date) = registration else {
        return 0;
    };
    match date.year().cmp(&fiscal_year) {
        std::cmp::Ordering::Less => MONTHS_PER_YEAR,
        std::cmp::Ordering::Equal => (MONTHS_PER_YEAR + 1).saturating_sub(date.month()),
        std::cmp::Ordering::Greater => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn earlier_year_is_fully_active() {
        assert_eq!(active_months(ymd(2019, 7, 15), 2024), 12);
    }

    #[test]
    fn same_year_counts_from_registration_month() {
        assert_eq!(active_months(ymd(2024, 3, 1), 2024), 10);
        assert_eq!(active_months(ymd(2024, 1, 31), 2024), 12);
        assert_eq!(active_months(ymd(2024, 12, 1), 2024), 1);
    }

    #[test]
    fn later_year_or_missing_is_inactive() {
        assert_eq!(active_months(ymd(2025, 1, 1), 2024), 0);
        assert_eq!(active_months(None, 2024), 0);
    }

    #[test]
    fn year_only_registration_is_active_all_year() {
        let registered = registration_date(&Cell::Text("2024".into()));
        assert_eq!(active_months(registered, 2024), 12);
    }

    #[test]
    fn registration_cells() {
        assert_eq!(registration_date(&Cell::Text("2024-03-01".into())), ymd(2024, 3, 1));
        assert_eq!(registration_date(&Cell::Text("03/01/2024".into())), ymd(2024, 3, 1));
        assert_eq!(registration_date(&Cell::Number(45352.0)), ymd(2024, 3, 1));
        assert_eq!(registration_date(&Cell::Text("2024".into())), ymd(2024, 1, 1));
        assert_eq!(registration_date(&Cell::Text("belum terdaftar".into())), None);
        assert_eq!(registration_date(&Cell::Empty), None);
    }
}
