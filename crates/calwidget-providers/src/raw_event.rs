//! Raw event type from calendar providers.
//!
//! [`RawEvent`] mirrors the `events.list` item shape closely enough to be
//! deserialized straight from the API body. Nothing is interpreted here: the
//! start marker stays a string until [`crate::normalize`] reads it.

use serde::{Deserialize, Serialize};

/// The `start` object of an event.
///
/// Exactly one of `date` (all-day) and `date_time` is expected, but neither
/// is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl RawEventTime {
    /// A bare `YYYY-MM-DD` start.
    #[cfg(test)]
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// A date-time start, as written by the server.
    #[cfg(test)]
    pub fn date_time(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Self::default()
        }
    }

    /// True when only a date is present.
    pub fn is_all_day(&self) -> bool {
        self.date.is_some() && self.date_time.is_none()
    }
}

/// A calendar event as received from a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Missing on malformed records; the normalizer reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RawEventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    /// `confirmed`, `tentative` or `cancelled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RawEvent {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, start: RawEventTime) -> Self {
        Self {
            id: id.into(),
            start: Some(start),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[cfg(test)]
    pub fn with_color_id(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    #[cfg(test)]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The start marker: `dateTime`, falling back to `date`.
    pub fn start_marker(&self) -> Option<&str> {
        let start = self.start.as_ref()?;
        start.date_time.as_deref().or(start.date.as_deref())
    }

    /// True when only a start date (no time of day) is present.
    pub fn is_all_day(&self) -> bool {
        self.start.as_ref().is_some_and(RawEventTime::is_all_day)
    }

    /// Returns the summary, or `None` when it is missing or blank.
    pub fn effective_title(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .filter(|summary| !summary.trim().is_empty())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}
