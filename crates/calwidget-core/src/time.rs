//! Time windows for calendar queries.
//!
//! The widget only ever asks for one calendar month at a time; this module
//! computes that window from a local date and resolves local wall-clock
//! values to UTC instants.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A closed time window `[start, end]` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant covered by the window.
    pub start: DateTime<Utc>,
    /// Last instant covered by the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Returns the window covering the calendar month that contains `date`,
    /// from midnight of its first day to the last microsecond of its last
    /// day, both taken in `tz`.
    pub fn month_of<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let first = first_of_month(date);
        let last = last_of_month(date);

        let start = first.and_time(chrono::NaiveTime::MIN);
        let end = last.and_time(chrono::NaiveTime::MIN) + Duration::days(1)
            - Duration::microseconds(1);

        Self::new(resolve_local(tz, start), resolve_local(tz, end))
    }
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns the last day of the month containing `date`.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Resolves a wall-clock value in `tz` to a UTC instant.
///
/// Ambiguous values (DST fold) take the earlier instant. Values that do not
/// exist in `tz` (DST gap) are moved forward by the usual one-hour shift.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match tz.from_local_datetime(&(wall + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => wall.and_utc(),
        },
    }
}
