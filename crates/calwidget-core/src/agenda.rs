//! Day grouping and the row model the window renders.
//!
//! Events are bucketed by their `dd/mm` day key, buckets are ordered
//! chronologically and labelled relative to today, and the result is
//! flattened into [`AgendaRow`]s so the GUI layer only has to map rows to
//! widgets.

use chrono::{Datelike, NaiveDate};

use crate::event::NormalizedEvent;
use crate::locale;

/// Events that share a day key, with the label shown above them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    /// The `dd/mm` key shared by every event in the group.
    pub key: String,
    /// E.g. `Hoje, 15/03 (2)` or `Sexta, 22/03 (1)`.
    pub date_label: String,
    pub events: Vec<NormalizedEvent>,
}

/// Style of a message row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Info,
    Error,
}

/// One visual row of the event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaRow {
    Placeholder { text: String, kind: PlaceholderKind },
    Separator,
    DayHeader(String),
    Event {
        title: String,
        /// Start time, or `Dia inteiro`.
        detail: String,
        color_id: String,
    },
}

impl AgendaRow {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Placeholder {
            text: text.into(),
            kind: PlaceholderKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Placeholder {
            text: text.into(),
            kind: PlaceholderKind::Error,
        }
    }
}

/// Groups `events` by day, ordered chronologically.
///
/// Events keep their input order within a group. Keys are ordered as dates
/// in `today`'s year, i.e. by month then day.
pub fn group_by_day(events: &[NormalizedEvent], today: NaiveDate) -> Vec<DayGroup> {
    let mut buckets: Vec<((u32, u32), String, Vec<NormalizedEvent>)> = Vec::new();

    for event in events {
        let key = event.day_key();
        match buckets.iter_mut().find(|(_, k, _)| *k == key) {
            Some((_, _, bucket)) => bucket.push(event.clone()),
            None => {
                let date = event.date();
                buckets.push(((date.month(), date.day()), key, vec![event.clone()]));
            }
        }
    }

    buckets.sort_by_key(|(order, _, _)| *order);

    let today_key = today.format("%d/%m").to_string();
    let tomorrow_key = today
        .succ_opt()
        .map(|d| d.format("%d/%m").to_string())
        .unwrap_or_default();

    buckets
        .into_iter()
        .map(|((month, day), key, events)| {
            let prefix = if key == today_key {
                locale::TODAY
            } else if key == tomorrow_key {
                locale::TOMORROW
            } else {
                NaiveDate::from_ymd_opt(today.year(), month, day)
                    .map(|d| locale::weekday_name(d.weekday()))
                    .unwrap_or("")
            };
            let date_label = format!("{prefix}, {key} ({})", events.len());
            DayGroup {
                key,
                date_label,
                events,
            }
        })
        .collect()
}

/// Renders `events` into rows: a header per day, one row per event and a
/// separator between days. An empty input renders a single placeholder.
pub fn render_agenda(events: &[NormalizedEvent], today: NaiveDate) -> Vec<AgendaRow> {
    if events.is_empty() {
        return vec![AgendaRow::info(locale::NO_EVENTS)];
    }
    render_groups(&group_by_day(events, today))
}

fn render_groups(groups: &[DayGroup]) -> Vec<AgendaRow> {
    let mut rows = Vec::new();

    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            rows.push(AgendaRow::Separator);
        }
        rows.push(AgendaRow::DayHeader(group.date_label.clone()));
        rows.extend(group.events.iter().map(|event| AgendaRow::Event {
            title: event.title().to_string(),
            detail: event.time().unwrap_or(locale::ALL_DAY).to_string(),
            color_id: event.color_id().to_string(),
        }));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn timed(id: &str, title: &str, start: NaiveDateTime) -> NormalizedEvent {
        NormalizedEvent::timed(id, title, start, "1", start.and_utc())
    }

    fn all_day(id: &str, title: &str, day: NaiveDate, color: &str) -> NormalizedEvent {
        let key = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
        NormalizedEvent::all_day(id, title, day, color, key)
    }

    fn sample() -> Vec<NormalizedEvent> {
        vec![
            timed("a", "Standup", at(2024, 3, 15, 9, 0)),
            all_day("b", "Trip", date(2024, 3, 15), "11"),
            timed("c", "Dentist", at(2024, 3, 16, 14, 30)),
            timed("d", "Review", at(2024, 3, 20, 10, 0)),
        ]
    }

    #[test]
    fn groups_ascend_and_relative_labels() {
        let groups = group_by_day(&sample(), date(2024, 3, 15));
        let labels: Vec<_> = groups.iter().map(|g| g.date_label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Hoje, 15/03 (2)", "Amanhã, 16/03 (1)", "Quarta, 20/03 (1)"]
        );
    }

    #[test]
    fn groups_sort_even_when_input_is_unordered() {
        let mut events = sample();
        events.reverse();
        let groups = group_by_day(&events, date(2024, 1, 1));
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["15/03", "16/03", "20/03"]);
        // input order inside a group is kept
        assert_eq!(groups[0].events[0].id(), "b");
        assert_eq!(groups[0].events[1].id(), "a");
    }

    #[test]
    fn every_event_in_group_shares_key() {
        for group in group_by_day(&sample(), date(2024, 3, 1)) {
            assert!(group.events.iter().all(|e| e.day_key() == group.key));
        }
    }

    #[test]
    fn months_order_before_days() {
        let events = vec![
            timed("a", "Late", at(2024, 4, 2, 8, 0)),
            timed("b", "Early", at(2024, 3, 30, 8, 0)),
        ];
        let groups = group_by_day(&events, date(2024, 3, 1));
        assert_eq!(groups[0].key, "30/03");
        assert_eq!(groups[1].key, "02/04");
    }

    #[test]
    fn grouping_is_idempotent() {
        let today = date(2024, 3, 15);
        let groups = group_by_day(&sample(), today);
        let flattened: Vec<_> = groups.iter().flat_map(|g| g.events.clone()).collect();
        assert_eq!(group_by_day(&flattened, today), groups);
    }

    #[test]
    fn leap_day_key_without_weekday_in_common_year() {
        let events = vec![all_day("a", "Leap", date(2024, 2, 29), "1")];
        let groups = group_by_day(&events, date(2023, 1, 10));
        assert_eq!(groups[0].date_label, ", 29/02 (1)");
    }

    #[test]
    fn empty_input_renders_one_placeholder() {
        let rows = render_agenda(&[], date(2024, 3, 15));
        assert_eq!(rows, vec![AgendaRow::info("Sem eventos para este mês.")]);
    }

    #[test]
    fn rows_for_a_month() {
        let rows = render_agenda(&sample(), date(2024, 3, 15));
        insta::assert_debug_snapshot!(rows, @r#"
        [
            DayHeader(
                "Hoje, 15/03 (2)",
            ),
            Event {
                title: "Standup",
                detail: "09:00",
                color_id: "1",
            },
            Event {
                title: "Trip",
                detail: "Dia inteiro",
                color_id: "11",
            },
            Separator,
            DayHeader(
                "Amanhã, 16/03 (1)",
            ),
            Event {
                title: "Dentist",
                detail: "14:30",
                color_id: "1",
            },
            Separator,
            DayHeader(
                "Quarta, 20/03 (1)",
            ),
            Event {
                title: "Review",
                detail: "10:00",
                color_id: "1",
            },
        ]
        "#);
    }

    #[test]
    fn tomorrow_across_month_boundary() {
        let events = vec![timed("a", "New month", at(2024, 4, 1, 9, 0))];
        let groups = group_by_day(&events, date(2024, 3, 31));
        assert_eq!(groups[0].date_label, "Amanhã, 01/04 (1)");
    }

    #[test]
    fn sort_key_is_not_used_for_grouping() {
        let start = at(2024, 3, 15, 23, 30);
        let shifted = NormalizedEvent::timed("a", "Late", start, "1", Utc::now());
        let groups = group_by_day(&[shifted], date(2024, 3, 1));
        assert_eq!(groups[0].key, "15/03");
    }
}
