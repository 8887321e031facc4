//! Normalized calendar events.
//!
//! [`NormalizedEvent`] is the single representation the rest of the widget
//! works with, whatever shape the provider's wire record had. Its fields are
//! private so that the all-day/time invariant can only be established by the
//! two constructors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Color identifier used when a record does not carry one.
pub const DEFAULT_COLOR_ID: &str = "1";

/// Title used when a record has no (or a blank) summary.
pub const UNTITLED: &str = "Evento sem título";

/// Placeholder shown in place of a time for events that failed to parse.
pub const UNKNOWN_TIME: &str = "??:??";

/// A calendar event ready for display.
///
/// `time` is present if and only if the event is not all-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    id: String,
    is_all_day: bool,
    date: NaiveDate,
    display_date: String,
    time: Option<String>,
    title: String,
    color_id: String,
    sort_key: DateTime<Utc>,
}

impl NormalizedEvent {
    /// Creates an all-day event on `date`.
    ///
    /// The sort key is the instant the day starts, as resolved by the caller.
    pub fn all_day(
        id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        color_id: impl Into<String>,
        sort_key: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            is_all_day: true,
            date,
            display_date: format_display_date(date),
            time: None,
            title: title.into(),
            color_id: color_id.into(),
            sort_key,
        }
    }

    /// Creates an event that starts at the wall-clock time `start`.
    pub fn timed(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        color_id: impl Into<String>,
        sort_key: DateTime<Utc>,
    ) -> Self {
        Self::with_time(
            id,
            title,
            start.date(),
            start.format("%H:%M").to_string(),
            color_id,
            sort_key,
        )
    }

    /// Creates a timed event whose time is an arbitrary label, used for
    /// records the normalizer could not read.
    pub fn with_time(
        id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
        color_id: impl Into<String>,
        sort_key: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            is_all_day: false,
            date,
            display_date: format_display_date(date),
            time: Some(time.into()),
            title: title.into(),
            color_id: color_id.into(),
            sort_key,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_all_day(&self) -> bool {
        self.is_all_day
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date as `dd/mm/yyyy`.
    pub fn display_date(&self) -> &str {
        &self.display_date
    }

    /// The start time as `HH:MM`; `None` for all-day events.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color_id(&self) -> &str {
        &self.color_id
    }

    pub fn sort_key(&self) -> DateTime<Utc> {
        self.sort_key
    }

    /// The `dd/mm` key events are grouped by.
    pub fn day_key(&self) -> String {
        self.date.format("%d/%m").to_string()
    }
}

fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
