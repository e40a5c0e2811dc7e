//! Pattern expansion: turning recurring rules into dated occurrences.
//!
//! One expander serves one `(year, region)` pair. Emitted dates always lie
//! within the calendar year; the aggregator assigns each occurrence to its
//! fiscal month afterwards.

use std::collections::HashMap;

use chrono::NaiveDate;

use simufisc_core::calendar::{
    add_days, first_of_month, is_weekend, last_of_month, shared_calendar, weekday0,
    HolidayCalendar, HolidayRegion,
};
use simufisc_core::models::{
    split_gross, Frequency, Occurrence, OccurrenceKind, Pattern, PatternKind, DAYS_MASK_ALL,
};

use crate::postings::build_postings;

/// Expands patterns into date-sorted occurrences for one target year.
pub struct PatternExpander<'a> {
    calendar: &'a HolidayCalendar,
    year: i32,
    region: HolidayRegion,
}

impl PatternExpander<'static> {
    /// Expander backed by the process-wide holiday calendar.
    pub fn new(year: i32, region: HolidayRegion) -> Self {
        Self {
            calendar: shared_calendar(),
            year,
            region,
        }
    }
}

impl<'a> PatternExpander<'a> {
    /// Expander with an explicit calendar (e.g. for cache isolation).
    pub fn with_calendar(calendar: &'a HolidayCalendar, year: i32, region: HolidayRegion) -> Self {
        Self {
            calendar,
            year,
            region,
        }
    }

    /// Expand one pattern into its occurrences, sorted by date.
    pub fn expand(&self, pattern: &Pattern) -> Vec<Occurrence> {
        let dates = match pattern.frequency {
            Frequency::Monthly => self.monthly_dates(pattern),
            Frequency::Quarterly => self.quarterly_dates(pattern),
            Frequency::Yearly => vec![first_of_month(self.year, pattern.start_month)],
            Frequency::Daily => self.daily_dates(pattern),
        };
        dates
            .into_iter()
            .map(|date| self.occurrence_on(pattern, date))
            .collect()
    }

    /// First-of-month for each month from the start month to December.
    fn monthly_dates(&self, pattern: &Pattern) -> Vec<NaiveDate> {
        (pattern.start_month..=12)
            .map(|month| first_of_month(self.year, month))
            .collect()
    }

    /// First month of each remaining quarter, starting at the quarter
    /// containing the start month.
    fn quarterly_dates(&self, pattern: &Pattern) -> Vec<NaiveDate> {
        let first_quarter = pattern.start_month.div_ceil(3);
        (first_quarter..=4)
            .map(|quarter| first_of_month(self.year, 3 * (quarter - 1) + 1))
            .collect()
    }

    /// Candidate dates of a daily pattern after the precedence rules.
    fn daily_dates(&self, pattern: &Pattern) -> Vec<NaiveDate> {
        let january_first = first_of_month(self.year, 1);
        let start = pattern
            .start_date
            .map_or(january_first, |d| d.max(january_first));
        let end = last_of_month(self.year, 12);
        if start > end {
            return Vec::new();
        }

        // Overrides are keyed by date; later duplicates win.
        let overrides: HashMap<NaiveDate, bool> = pattern
            .day_off_overrides
            .iter()
            .map(|o| (o.date, o.active))
            .collect();
        let holidays = self.calendar.holiday_dates(self.year, self.region);

        let mut dates = Vec::new();
        let mut day = start;
        while day <= end {
            let active = match overrides.get(&day) {
                // An override is the final verdict for its date.
                Some(&verdict) => verdict,
                None => {
                    let mask = pattern.days_mask.unwrap_or(DAYS_MASK_ALL);
                    let mut active = mask >> weekday0(day) & 1 == 1;
                    if active && pattern.exclude_weekends && is_weekend(day) {
                        active = false;
                    }
                    if active && pattern.exclude_holidays && holidays.contains(&day) {
                        active = false;
                    }
                    active
                }
            };
            if active {
                dates.push(day);
            }
            day = add_days(day, 1);
        }
        dates
    }

    /// Build the occurrence for one concrete date.
    fn occurrence_on(&self, pattern: &Pattern, date: NaiveDate) -> Occurrence {
        let rate = pattern.vat_rate().as_fraction();
        let (net, vat) = split_gross(pattern.amount, rate);
        let (kind, category, vat_deductible) = match &pattern.kind {
            PatternKind::Revenue { .. } => (OccurrenceKind::Revenue, None, None),
            PatternKind::Expense {
                category,
                vat_deductible,
            } => (OccurrenceKind::Expense, Some(*category), Some(*vat_deductible)),
        };
        let postings = build_postings(
            kind,
            &pattern.name,
            net,
            vat,
            vat_deductible.unwrap_or(false),
        );

        Occurrence {
            id: Occurrence::compose_id(&pattern.id, date),
            pattern_id: pattern.id.clone(),
            pattern_name: pattern.name.clone(),
            date,
            kind,
            category,
            gross_amount: pattern.amount,
            vat_rate: rate,
            vat_amount: vat,
            net_amount: net,
            vat_deductible,
            postings,
        }
    }
}
