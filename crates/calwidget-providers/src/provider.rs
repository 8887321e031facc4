//! CalendarProvider trait definition.
//!
//! The month pipeline only needs one thing from a backend: the raw events in
//! a time window. Keeping that behind a trait lets tests drive the pipeline
//! with an in-memory provider.

use std::future::Future;
use std::pin::Pin;

use calwidget_core::TimeWindow;

#[cfg(test)]
use crate::error::ProviderError;
use crate::error::ProviderResult;
use crate::raw_event::RawEvent;

/// Default cap on the number of events per fetch.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Calendar read when none is configured.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Options for fetching events.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Only events starting inside this window are returned.
    pub time_window: TimeWindow,
    /// The result is truncated to this many events.
    pub max_results: usize,
    /// Expand recurring events into their instances.
    pub expand_recurring: bool,
    pub calendar_id: String,
}

impl FetchOptions {
    pub fn new(time_window: TimeWindow) -> Self {
        Self {
            time_window,
            max_results: DEFAULT_MAX_RESULTS,
            expand_recurring: true,
            calendar_id: PRIMARY_CALENDAR.to_string(),
        }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }
}

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so the UI can hold an
/// `Arc<dyn CalendarProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A source of calendar events.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "google").
    fn name(&self) -> &str;

    /// Fetches the events of one calendar, in server order.
    ///
    /// Implementations follow pagination internally, drop cancelled events
    /// and never return more than `options.max_results` events.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures, etc.
    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>>;
}

/// A provider that always returns an error.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ErrorProvider {
    name: String,
    error: ProviderError,
}

#[cfg(test)]
impl ErrorProvider {
    pub(crate) fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

#[cfg(test)]
impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_events(&self, _options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<RawEvent>>> {
        // ProviderError is not Clone because of its boxed source
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}
