//! Calendar-month arithmetic.
//!
//! Monthly registration counts are keyed by the last day of their month. All
//! period alignment goes through these helpers so that shifting by a year or a
//! quarter moves whole calendar months rather than a fixed number of days.

use chrono::{Datelike, Months, NaiveDate};

/// Number of days in the given month, or `None` for an invalid year/month.
fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    days_in_month(date.year(), date.month())
        .and_then(|d| date.with_day(d))
        .unwrap_or(date)
}

/// Whether `date` is the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    month_end(date) == date
}

/// Shift `date` by a signed number of calendar months.
///
/// Month-end dates stay on the month end of the target month, so 2024-02-29
/// minus 12 months is 2023-02-28 and 2023-02-28 plus 12 months is 2024-02-29.
/// Any other day is clamped to the length of the target month. Returns `None`
/// only when the result falls outside chrono's calendar.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let delta = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(delta)?
    } else {
        date.checked_sub_months(delta)?
    };

    if is_month_end(date) {
        Some(month_end(shifted))
    } else {
        Some(shifted)
    }
}

/// Inclusive sequence of month ends from the month of `start` to the month of `end`.
///
/// Empty when `start` falls in a later month than `end`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let last = month_end(end);
    let mut current = month_end(start);
    let mut months = Vec::new();

    while current <= last {
        months.push(current);
        match shift_months(current, 1) {
            Some(next) => current = next,
            None => break,
        }
    }

    months
}

/// Parse a date as written by common tabular exports.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` (any trailing fraction or offset is ignored) and a
/// bare `YYYY-MM`, which resolves to the first of the month. Returns `None`
/// when parsing fails.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Date-times: keep only the date part.
    let date_part = value
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(value);

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }

    let mut parts = date_part.split(['-', '/']);
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}
