//! RawEvent to NormalizedEvent conversion.
//!
//! The start marker is read in three shapes:
//! 1. a `Z`-suffixed RFC 3339 date-time (UTC),
//! 2. any other value containing `T`: RFC 3339 with an offset, or a naive
//!    date-time taken in the local timezone,
//! 3. a bare `YYYY-MM-DD` date.
//!
//! The displayed date and time are the wall-clock values as written; only
//! the sort key is resolved to an instant. Normalization never fails: a
//! record that cannot be read becomes a visible placeholder event.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use tracing::warn;

use calwidget_core::NormalizedEvent;
use calwidget_core::event::{DEFAULT_COLOR_ID, UNKNOWN_TIME, UNTITLED};
use calwidget_core::time::resolve_local;

use crate::raw_event::RawEvent;

/// Why a record could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("event has no start time")]
    MissingStart,

    #[error("invalid start '{value}': {reason}")]
    InvalidStart { value: String, reason: String },
}

impl FormatError {
    fn invalid(value: &str, reason: impl ToString) -> Self {
        Self::InvalidStart {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Naive date-time layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A parsed start marker: the wall-clock value as written and the instant
/// used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParsedStart {
    wall: NaiveDateTime,
    instant: DateTime<Utc>,
}

/// Converts a [`RawEvent`] to a [`NormalizedEvent`].
///
/// `now` supplies the timezone for naive values and the date of the
/// fallback event.
pub fn normalize_event<Tz: TimeZone>(raw: &RawEvent, now: &DateTime<Tz>) -> NormalizedEvent {
    match try_normalize(raw, &now.timezone()) {
        Ok(event) => event,
        Err(err) => {
            warn!(event_id = %raw.id, error = %err, "failed to normalize event");
            fallback_event(raw, &err, now)
        }
    }
}

/// Normalizes a batch, keeping input order.
pub fn normalize_events<Tz: TimeZone>(raws: &[RawEvent], now: &DateTime<Tz>) -> Vec<NormalizedEvent> {
    raws.iter().map(|raw| normalize_event(raw, now)).collect()
}

/// Converts a record, reporting why it could not be read.
pub fn try_normalize<Tz: TimeZone>(raw: &RawEvent, tz: &Tz) -> Result<NormalizedEvent, FormatError> {
    let marker = raw.start_marker().ok_or(FormatError::MissingStart)?;
    let start = parse_start(marker, tz)?;

    let title = raw.effective_title().unwrap_or(UNTITLED);
    let color_id = raw.color_id.as_deref().unwrap_or(DEFAULT_COLOR_ID);

    if raw.is_all_day() {
        Ok(NormalizedEvent::all_day(
            &raw.id,
            title,
            start.wall.date(),
            color_id,
            start.instant,
        ))
    } else {
        Ok(NormalizedEvent::timed(
            &raw.id,
            title,
            start.wall,
            color_id,
            start.instant,
        ))
    }
}

fn parse_start<Tz: TimeZone>(marker: &str, tz: &Tz) -> Result<ParsedStart, FormatError> {
    if marker.contains('Z') {
        let dt = DateTime::parse_from_rfc3339(marker).map_err(|e| FormatError::invalid(marker, e))?;
        return Ok(ParsedStart {
            wall: dt.naive_local(),
            instant: dt.with_timezone(&Utc),
        });
    }

    if marker.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(marker) {
            return Ok(ParsedStart {
                wall: dt.naive_local(),
                instant: dt.with_timezone(&Utc),
            });
        }
        let wall = parse_naive(marker)?;
        return Ok(ParsedStart {
            wall,
            instant: resolve_local(tz, wall),
        });
    }

    let date =
        NaiveDate::parse_from_str(marker, "%Y-%m-%d").map_err(|e| FormatError::invalid(marker, e))?;
    let wall = date.and_time(NaiveTime::MIN);
    Ok(ParsedStart {
        wall,
        instant: resolve_local(tz, wall),
    })
}

fn parse_naive(marker: &str) -> Result<NaiveDateTime, FormatError> {
    let mut last_err = None;
    for format in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(marker, format) {
            Ok(wall) => return Ok(wall),
            Err(e) => last_err = Some(e),
        }
    }
    Err(match last_err {
        Some(e) => FormatError::invalid(marker, e),
        None => FormatError::invalid(marker, "no format matched"),
    })
}

fn fallback_event<Tz: TimeZone>(raw: &RawEvent, err: &FormatError, now: &DateTime<Tz>) -> NormalizedEvent {
    NormalizedEvent::with_time(
        &raw.id,
        format!("Erro no evento: {err}"),
        now.date_naive(),
        UNKNOWN_TIME,
        DEFAULT_COLOR_ID,
        now.with_timezone(&Utc),
    )
}
