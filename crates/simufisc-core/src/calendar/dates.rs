//! Date kernel: ISO formatting, pure date arithmetic, fiscal-month mapping.
//!
//! Weekday numbering follows the engine convention `0 = Sunday .. 6 = Saturday`.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};

/// Wire format for dates.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso(input: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(input, ISO_FORMAT)
        .map_err(|_| EngineError::validation(format!("invalid ISO date: {input}")))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Add (or subtract) a number of days.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date + Days::new(days as u64)
    } else {
        date - Days::new(days.unsigned_abs())
    }
}

/// Add (or subtract) a number of months, clamping the day-of-month.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    if months >= 0 {
        date + Months::new(months as u32)
    } else {
        date - Months::new(months.unsigned_abs())
    }
}

/// First day of a month. `month` must be in `1..=12`.
pub fn first_of_month(year: i32, month: u32) -> NaiveDate {
    debug_assert!((1..=12).contains(&month));
    NaiveDate::from_ymd_opt(year, month, 1).expect("month in 1..=12")
}

/// Last day of a month. `month` must be in `1..=12`.
pub fn last_of_month(year: i32, month: u32) -> NaiveDate {
    first_of_month(year, month) + Months::new(1) - Days::new(1)
}

/// Weekday with `0 = Sunday .. 6 = Saturday`.
pub fn weekday0(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Check for Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Map a calendar month to its 1-based position in the fiscal year
/// starting at `fiscal_start`.
pub fn calendar_to_fiscal(month: u32, fiscal_start: u32) -> u32 {
    (month + 12 - fiscal_start) % 12 + 1
}

/// Calendar months in fiscal order: `[s, s+1, .., 12, 1, .., s-1]`.
pub fn fiscal_month_order(fiscal_start: u32) -> [u32; 12] {
    let mut order = [0u32; 12];
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = (fiscal_start - 1 + i as u32) % 12 + 1;
    }
    order
}

/// English month name. `month` must be in `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES[(month as usize - 1) % 12]
}

/// Display label for a month under a fiscal year starting at `fiscal_start`.
///
/// A calendar-aligned fiscal year shows the bare month name; otherwise the
/// fiscal position is appended, e.g. `"April (FY Month 1)"`.
pub fn month_display(month: u32, fiscal_start: u32) -> String {
    if fiscal_start == 1 {
        month_name(month).to_string()
    } else {
        format!(
            "{} (FY Month {})",
            month_name(month),
            calendar_to_fiscal(month, fiscal_start)
        )
    }
}
