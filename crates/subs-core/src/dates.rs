//! Month-granular date arithmetic
//!
//! Subscriptions bill by calendar month, so every date in the system is
//! normalized to the first day of its month and distances are counted in
//! whole months. The wire format for a month is `MM-YYYY`.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Textual month format used on the wire (chrono syntax)
pub const MONTH_YEAR_FORMAT: &str = "%m-%Y";

/// Rejected month-year input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month-year value '{0}', expected MM-YYYY")]
pub struct MonthYearError(pub String);

/// Earlier of two dates (either operand on ties)
pub fn earlier_of(a: NaiveDate, b: NaiveDate) -> NaiveDate {
    if a < b {
        a
    } else {
        b
    }
}

/// Later of two dates (either operand on ties)
pub fn later_of(a: NaiveDate, b: NaiveDate) -> NaiveDate {
    if a > b {
        a
    } else {
        b
    }
}

/// Whole months between two dates, ignoring the day of month
///
/// The pair is ordered first, so the result is never negative and
/// `months_between(a, b) == months_between(b, a)`.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    let (from, to) = if a > b { (b, a) } else { (a, b) };

    let years = i64::from(to.year() - from.year());
    let months = i64::from(to.month()) - i64::from(from.month());

    years * 12 + months
}

/// Normalize a date to the first day of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse a strict `MM-YYYY` string into the first day of that month
pub fn parse_month_year(value: &str) -> Result<NaiveDate, MonthYearError> {
    let err = || MonthYearError(value.to_string());

    let (month, year) = value.split_once('-').ok_or_else(err)?;
    if month.len() != 2
        || year.len() != 4
        || !month.bytes().all(|b| b.is_ascii_digit())
        || !year.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(err());
    }

    let month: u32 = month.parse().map_err(|_| err())?;
    let year: i32 = year.parse().map_err(|_| err())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(err)
}

/// Parse an optional `MM-YYYY` string where the empty string means absent
pub fn parse_optional_month_year(value: &str) -> Result<Option<NaiveDate>, MonthYearError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_month_year(value).map(Some)
}

/// Format a date as `MM-YYYY`
pub fn format_month_year(date: NaiveDate) -> String {
    date.format(MONTH_YEAR_FORMAT).to_string()
}
