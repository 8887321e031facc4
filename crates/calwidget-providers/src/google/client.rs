//! Google Calendar API client.
//!
//! A thin HTTP layer over `events.list`: request building, pagination and
//! status mapping. Authentication is the caller's job.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// Parameters of one `events.list` call.
#[derive(Debug, Clone)]
pub struct ListEventsRequest<'a> {
    pub calendar_id: &'a str,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub max_results: usize,
    pub single_events: bool,
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            http_client,
            api_base: api_base.into(),
        })
    }

    /// Lists events, following pages until exhausted or `max_results` is
    /// reached. Cancelled instances are dropped.
    pub async fn list_events(
        &self,
        access_token: &str,
        request: &ListEventsRequest<'_>,
    ) -> ProviderResult<Vec<RawEvent>> {
        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(access_token, request, page_token.as_deref())
                .await?;

            all_events.extend(page.items.into_iter().filter(|event| !event.is_cancelled()));

            if all_events.len() >= request.max_results {
                all_events.truncate(request.max_results);
                break;
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            count = all_events.len(),
            calendar = request.calendar_id,
            "fetched events"
        );
        Ok(all_events)
    }

    async fn list_events_page(
        &self,
        access_token: &str,
        request: &ListEventsRequest<'_>,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(request.calendar_id)
        );

        let mut builder = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                (
                    "timeMin",
                    request.time_min.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ),
                (
                    "timeMax",
                    request.time_max.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ),
                ("maxResults", request.max_results.to_string()),
                ("singleEvents", request.single_events.to_string()),
            ]);

        // orderBy=startTime is only accepted together with singleEvents
        if request.single_events {
            builder = builder.query(&[("orderBy", "startTime")]);
        }

        if let Some(token) = page_token {
            builder = builder.query(&[("pageToken", token)]);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::network("request timeout")
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {e}"))
            } else {
                ProviderError::network(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {s} seconds"))
                    .unwrap_or_default()
            )));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::authorization("access denied to calendar"));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!("API error ({status}): {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {e}")))?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {e}"))
        })
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
    next_page_token: Option<String>,
}
