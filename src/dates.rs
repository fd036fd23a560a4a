//! Calendar helpers shared by the schedule generator and the command-line shell.
//!
//! Dates are plain `NaiveDate` values: no time of day and no time zone, so an
//! ISO `YYYY-MM-DD` string always maps to the same calendar day.

use chrono::{Months, NaiveDate};

use crate::error::{LoanError, Result};

/// Parses `YYYY-MM-DD` text into a calendar date.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| LoanError::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Adds whole months to `date`.
///
/// A day that does not exist in the target month is clamped to that month's
/// last day, so 2024-01-31 plus one month is 2024-02-29. Callers always offset
/// from the agreement date rather than chaining, which keeps the day of month
/// from drifting after a short month.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or(LoanError::DateOutOfRange { date, months })
}
