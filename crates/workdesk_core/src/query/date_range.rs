//! Relative time-range resolution.
//!
//! # Responsibility
//! - Map a symbolic time-range tag to a concrete inclusive date interval.
//!
//! # Invariants
//! - Resolution is a pure function of `(tag, today)`.
//! - Unknown tags and `all` resolve to an unbounded interval, never an error.
//! - Weeks run Monday through Sunday.

use crate::model::work_item::TimeRange;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Inclusive calendar interval. Both bounds absent means "no restriction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub const fn single_day(day: NaiveDate) -> Self {
        Self::between(day, day)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn as_tuple(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.start, self.end)
    }
}

/// Resolves a loose tag string against `today`.
///
/// Tags outside the closed vocabulary degrade to an unbounded range.
pub fn resolve_date_range(tag: &str, today: NaiveDate) -> DateRange {
    match TimeRange::from_tag_lenient(tag) {
        Some(range) => range.resolve(today),
        None => DateRange::unbounded(),
    }
}

impl TimeRange {
    /// Resolves this tag into an inclusive interval relative to `today`.
    ///
    /// Arithmetic that would leave chrono's supported date span degrades to
    /// an unbounded range.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let resolved = match self {
            Self::Today => Some(DateRange::single_day(today)),
            Self::Tomorrow => today.succ_opt().map(DateRange::single_day),
            Self::ThisWeek => week_starting(monday_of(today)),
            Self::NextWeek => monday_of(today)
                .and_then(|monday| monday.checked_add_days(Days::new(7)))
                .and_then(|monday| week_starting(Some(monday))),
            Self::ThisMonth => month_of(today),
            Self::Recent | Self::PastWeek => trailing_days(today, 7),
            Self::PastMonth => trailing_days(today, 30),
            Self::All => None,
        };
        resolved.unwrap_or(DateRange::unbounded())
    }
}

fn monday_of(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
}

fn week_starting(monday: Option<NaiveDate>) -> Option<DateRange> {
    let monday = monday?;
    let sunday = monday.checked_add_days(Days::new(6))?;
    Some(DateRange::between(monday, sunday))
}

fn month_of(day: NaiveDate) -> Option<DateRange> {
    let first = NaiveDate::from_ymd_opt(day.year(), day.month(), 1)?;
    let (next_year, next_month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(DateRange::between(first, last))
}

fn trailing_days(today: NaiveDate, days: u64) -> Option<DateRange> {
    let start = today.checked_sub_days(Days::new(days))?;
    Some(DateRange::between(start, today))
}
