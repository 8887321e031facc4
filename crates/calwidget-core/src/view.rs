//! Event list state.

use chrono::NaiveDate;

use crate::agenda::{self, AgendaRow};
use crate::event::NormalizedEvent;
use crate::locale;

/// What the event list region is showing.
///
/// Every refresh starts from [`ViewState::Loading`] and settles in one of
/// the other three states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Loading,
    Populated {
        events: Vec<NormalizedEvent>,
        today: NaiveDate,
    },
    Empty {
        today: NaiveDate,
    },
    Error(String),
}

impl ViewState {
    /// Settles a successful fetch.
    pub fn loaded(events: &[NormalizedEvent], today: NaiveDate) -> Self {
        if events.is_empty() {
            Self::Empty { today }
        } else {
            Self::Populated {
                events: events.to_vec(),
                today,
            }
        }
    }

    /// Settles a failed fetch.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Header counter text, or `None` to keep the last count shown.
    ///
    /// Only a settled fetch changes the counter; loading and failed
    /// refreshes leave the previous value in place.
    pub fn count_label(&self) -> Option<String> {
        match self {
            Self::Populated { events, .. } => Some(locale::event_count(events.len())),
            Self::Empty { .. } => Some(locale::event_count(0)),
            Self::Loading | Self::Error(_) => None,
        }
    }

    /// Rows to show in the list region. Never empty.
    pub fn rows(&self) -> Vec<AgendaRow> {
        match self {
            Self::Loading => vec![AgendaRow::info(locale::LOADING)],
            Self::Populated { events, today } => agenda::render_agenda(events, *today),
            Self::Empty { today } => agenda::render_agenda(&[], *today),
            Self::Error(message) => vec![AgendaRow::error(locale::refresh_failed(message))],
        }
    }
}
