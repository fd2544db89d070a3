use crate::api::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct WorkingWeeks {
    pub total_days: i64,
    pub calendar_weeks: f64,
    pub weekdays: i64,
    /// Weekdays minus PTO. Negative when PTO exceeds the weekdays in range.
    pub working_days: i64,
    pub working_weeks: f64,
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| Error::InvalidRange(format!("'{}' is not a valid YYYY-MM-DD date: {}", value, err)))
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Splits `[start, end)` into calendar and 5-day working weeks.
///
/// # Arguments
/// * `start` - First day of the range
/// * `end` - Day after the last counted weekday
/// * `pto_days` - Days off subtracted from the weekday count, without clamping
pub fn working_weeks(start: NaiveDate, end: NaiveDate, pto_days: u32) -> Result<WorkingWeeks> {
    if end < start {
        return Err(Error::InvalidRange(format!("end date {} is before start date {}", end, start)));
    }
    let total_days = end.signed_duration_since(start).num_days();
    let weekdays = start
        .iter_days()
        .take_while(|day| *day < end)
        .filter(|day| is_weekday(*day))
        .count() as i64;
    let working_days = weekdays - i64::from(pto_days);
    Ok(WorkingWeeks {
        total_days,
        calendar_weeks: total_days as f64 / 7.0,
        weekdays,
        working_days,
        working_weeks: working_days as f64 / 5.0,
    })
}

#[cfg(test)]
fn date(value: &str) -> NaiveDate {
    parse_date(value).unwrap()
}

#[test]
fn full_week_test() {
    let weeks = working_weeks(date("2025-03-03"), date("2025-03-10"), 0).unwrap();
    assert_eq!(weeks.total_days, 7);
    assert_eq!(weeks.calendar_weeks, 1.0);
    assert_eq!(weeks.weekdays, 5);
    assert_eq!(weeks.working_days, 5);
    assert_eq!(weeks.working_weeks, 1.0);
}

#[test]
fn end_date_is_exclusive_test() {
    // Monday to Friday: the Friday itself is not scanned
    let weeks = working_weeks(date("2025-03-03"), date("2025-03-07"), 0).unwrap();
    assert_eq!(weeks.total_days, 4);
    assert_eq!(weeks.weekdays, 4);
    assert_eq!(weeks.working_weeks, 0.8);
}

#[test]
fn weekend_only_test() {
    let weeks = working_weeks(date("2025-03-08"), date("2025-03-10"), 0).unwrap();
    assert_eq!(weeks.total_days, 2);
    assert_eq!(weeks.weekdays, 0);
    assert_eq!(weeks.working_weeks, 0.0);
}

#[test]
fn pto_subtracted_test() {
    let weeks = working_weeks(date("2025-03-03"), date("2025-03-17"), 3).unwrap();
    assert_eq!(weeks.weekdays, 10);
    assert_eq!(weeks.working_days, 7);
    assert_eq!(weeks.working_weeks, 1.4);
}

#[test]
fn pto_exceeding_weekdays_is_not_clamped_test() {
    let weeks = working_weeks(date("2025-03-03"), date("2025-03-10"), 8).unwrap();
    assert_eq!(weeks.working_days, -3);
    assert_eq!(weeks.working_weeks, -0.6);
}

#[test]
fn same_day_range_test() {
    let weeks = working_weeks(date("2025-03-03"), date("2025-03-03"), 0).unwrap();
    assert_eq!(weeks.total_days, 0);
    assert_eq!(weeks.weekdays, 0);
    assert_eq!(weeks.calendar_weeks, 0.0);
}

#[test]
fn default_period_test() {
    let weeks = working_weeks(date("2025-02-28"), date("2026-02-02"), 0).unwrap();
    assert_eq!(weeks.total_days, 339);
    assert_eq!(weeks.weekdays, 241);
}

#[test]
fn reversed_range_test() {
    let result = working_weeks(date("2025-03-10"), date("2025-03-03"), 0);
    assert!(matches!(result, Err(Error::InvalidRange(_))));
}

#[test]
fn invalid_date_test() {
    assert!(matches!(parse_date("2025-02-30"), Err(Error::InvalidRange(_))));
    assert!(matches!(parse_date("yesterday"), Err(Error::InvalidRange(_))));
    assert_eq!(parse_date(" 2025-02-28 ").unwrap(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
}
