//! The current-month pipeline: fetch, normalize, order.

use chrono::{DateTime, TimeZone};
use tracing::{debug, info};

use calwidget_core::{NormalizedEvent, TimeWindow};

use crate::error::FetchError;
use crate::normalize::normalize_events;
use crate::provider::{CalendarProvider, FetchOptions};

/// Loads the events of the month containing `now`.
///
/// The window runs from the first to the last instant of that month in
/// `now`'s timezone. Normalized events are stable-sorted by start instant,
/// so well-formed events keep the server's order.
///
/// # Errors
///
/// Any provider failure is returned as a [`FetchError`]; nothing is retried.
pub async fn load_month<Tz>(
    provider: &dyn CalendarProvider,
    max_results: usize,
    calendar_id: &str,
    now: DateTime<Tz>,
) -> Result<Vec<NormalizedEvent>, FetchError>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    let window = TimeWindow::month_of(now.date_naive(), &now.timezone());
    debug!(
        provider = provider.name(),
        start = %window.start,
        end = %window.end,
        "fetching month"
    );

    let options = FetchOptions::new(window)
        .with_max_results(max_results)
        .with_calendar_id(calendar_id);
    let raws = provider.fetch_events(options).await?;

    let mut events = normalize_events(&raws, &now);
    events.sort_by_key(NormalizedEvent::sort_key);

    info!(provider = provider.name(), count = events.len(), "loaded month");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{FixedOffset, Utc};

    use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
    use crate::provider::{BoxFuture, ErrorProvider};
    use crate::raw_event::{RawEvent, RawEventTime};

    /// Returns canned events and records the options it was called with.
    struct StaticProvider {
        events: Vec<RawEvent>,
        seen: Mutex<Option<FetchOptions>>,
    }

    impl StaticProvider {
        fn new(events: Vec<RawEvent>) -> Self {
            Self {
                events,
                seen: Mutex::new(None),
            }
        }
    }

    impl CalendarProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch_events(
            &self,
            options: FetchOptions,
        ) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
            let events: Vec<_> = self
                .events
                .iter()
                .take(options.max_results)
                .cloned()
                .collect();
            *self.seen.lock().unwrap() = Some(options);
            Box::pin(async move { Ok(events) })
        }
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn requests_the_local_month() {
        let provider = StaticProvider::new(Vec::new());
        let events = load_month(&provider, 100, "primary", now()).await.unwrap();
        assert!(events.is_empty());

        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen.time_window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap()
        );
        assert_eq!(
            seen.time_window.end,
            Utc.with_ymd_and_hms(2024, 4, 1, 2, 59, 59).unwrap()
                + chrono::Duration::microseconds(999_999)
        );
        assert_eq!(seen.max_results, 100);
        assert!(seen.expand_recurring);
        assert_eq!(seen.calendar_id, "primary");
    }

    #[tokio::test]
    async fn sorts_by_start_and_keeps_fallbacks() {
        let provider = StaticProvider::new(vec![
            RawEvent::new("late", RawEventTime::date_time("2024-03-20T10:00:00Z")),
            RawEvent::new("broken", RawEventTime::date_time("nope")),
            RawEvent::new("early", RawEventTime::date("2024-03-02")),
        ]);
        let events = load_month(&provider, 100, "primary", now()).await.unwrap();

        let ids: Vec<_> = events.iter().map(NormalizedEvent::id).collect();
        // the fallback sorts at `now` (10/03)
        assert_eq!(ids, ["early", "broken", "late"]);
    }

    #[tokio::test]
    async fn equal_starts_keep_server_order() {
        let provider = StaticProvider::new(vec![
            RawEvent::new("b", RawEventTime::date("2024-03-15")),
            RawEvent::new("a", RawEventTime::date("2024-03-15")),
        ]);
        let events = load_month(&provider, 100, "primary", now()).await.unwrap();
        let ids: Vec<_> = events.iter().map(NormalizedEvent::id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn passes_the_cap() {
        let raws = (0..5)
            .map(|i| RawEvent::new(i.to_string(), RawEventTime::date("2024-03-15")))
            .collect();
        let provider = StaticProvider::new(raws);
        let events = load_month(&provider, 3, "primary", now()).await.unwrap();
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn provider_failure_is_a_fetch_error() {
        let provider = ErrorProvider::new("google", ProviderError::network("timeout"));
        let err = load_month(&provider, 100, "primary", now()).await.unwrap_err();
        assert_eq!(err.to_string(), "[google] network_error: timeout");
        assert_eq!(err.0.code(), ProviderErrorCode::NetworkError);
    }
}
