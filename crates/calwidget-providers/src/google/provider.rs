//! [`CalendarProvider`] implementation for Google Calendar.

use std::sync::Arc;

use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, CalendarProvider, FetchOptions};
use crate::raw_event::RawEvent;

use super::client::{GoogleCalendarClient, ListEventsRequest};
use super::credentials::CredentialManager;

/// Google Calendar provider.
///
/// Every fetch asks the [`CredentialManager`] for a fresh access token, so an
/// expired token is refreshed transparently between two refreshes of the
/// widget.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    credentials: Arc<CredentialManager>,
    client: GoogleCalendarClient,
}

impl GoogleProvider {
    pub fn new(credentials: Arc<CredentialManager>) -> ProviderResult<Self> {
        let config = credentials.config();
        let client = GoogleCalendarClient::new(&config.api_base, config.timeout)?;
        Ok(Self {
            credentials,
            client,
        })
    }

    async fn fetch(&self, options: FetchOptions) -> ProviderResult<Vec<RawEvent>> {
        let access_token = self.credentials.access_token().await?;

        let request = ListEventsRequest {
            calendar_id: &options.calendar_id,
            time_min: options.time_window.start,
            time_max: options.time_window.end,
            max_results: options.max_results,
            single_events: options.expand_recurring,
        };
        debug!(calendar = %options.calendar_id, "listing events");

        self.client.list_events(&access_token, &request).await
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            self.fetch(options)
                .await
                .map_err(|e| e.with_provider(self.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::config::GoogleConfig;
    use crate::google::test_support::serve_sequence;
    use crate::google::tokens::{TokenInfo, TokenStorage};
    use calwidget_core::TimeWindow;
    use chrono::{NaiveDate, Utc};

    fn options() -> FetchOptions {
        FetchOptions::new(TimeWindow::month_of(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            &Utc,
        ))
    }

    #[tokio::test]
    async fn fetches_with_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        TokenStorage::new(&token_path)
            .save(&TokenInfo::new("stored-access", None, Some(3600), vec![]))
            .unwrap();

        let (base, requests) = serve_sequence(vec![(
            "200 OK",
            r#"{"items": [{"id": "e1", "summary": "Demo", "start": {"date": "2024-03-15"}}]}"#,
        )]);
        let config = GoogleConfig::new(dir.path().join("credentials.json"), &token_path)
            .with_api_base(base);
        let provider = GoogleProvider::new(Arc::new(CredentialManager::new(config))).unwrap();

        let events = provider.fetch_events(options()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("Demo"));

        let sent = requests.recv().unwrap();
        assert!(sent.to_ascii_lowercase().contains("bearer stored-access"));
    }

    #[tokio::test]
    async fn missing_token_is_tagged_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new(
            dir.path().join("credentials.json"),
            dir.path().join("token.json"),
        );
        let provider = GoogleProvider::new(Arc::new(CredentialManager::new(config))).unwrap();

        let err = provider.fetch_events(options()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert_eq!(err.provider(), Some("google"));
    }
}
