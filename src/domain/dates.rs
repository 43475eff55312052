//! Calendar-day helpers.
//!
//! A trading day is a [`NaiveDate`]: the journal records local calendar days
//! with no time component, so comparisons are always at day granularity.

use crate::domain::error::JournalError;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` string.
pub fn parse_day(input: &str) -> Result<NaiveDate, JournalError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(JournalError::invalid_date(input, "expected YYYY-MM-DD"));
    }

    NaiveDate::parse_from_str(input, DAY_FORMAT)
        .map_err(|_| JournalError::invalid_date(input, "no such calendar day"))
}

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// The Monday on or before `day`.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

pub fn add_days(day: NaiveDate, n: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(n.unsigned_abs());
    if n >= 0 {
        day.checked_add_days(magnitude)
    } else {
        day.checked_sub_days(magnitude)
    }
}

/// Month offset; the day-of-month is clamped to the target month's length.
pub fn add_months(day: NaiveDate, n: i32) -> Option<NaiveDate> {
    let magnitude = Months::new(n.unsigned_abs());
    if n >= 0 {
        day.checked_add_months(magnitude)
    } else {
        day.checked_sub_months(magnitude)
    }
}

pub fn add_years(day: NaiveDate, n: i32) -> Option<NaiveDate> {
    add_months(day, n.checked_mul(12)?)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = add_months(first, 1)?;
    u32::try_from((next - first).num_days()).ok()
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
