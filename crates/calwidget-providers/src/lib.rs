//! Calendar backends for the widget.
//!
//! - [`CalendarProvider`] - what a backend must do (fetch raw events)
//! - [`RawEvent`] - the wire record as received
//! - [`normalize_event`] - RawEvent to [`calwidget_core::NormalizedEvent`]
//! - [`load_month`] - fetch, normalize and order the current month
//! - [`google`] - Google Calendar: OAuth, token persistence, API client
//!
//! ```text
//!   Google API ──► GoogleProvider ──► Vec<RawEvent>
//!                        ▲                  │ normalize_events()
//!              CredentialManager            ▼
//!                                   Vec<NormalizedEvent>
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod month;
pub mod normalize;
pub mod provider;
pub mod raw_event;

pub use error::{AuthError, FetchError, ProviderError, ProviderErrorCode, ProviderResult};
pub use month::load_month;
pub use normalize::{FormatError, normalize_event, normalize_events};
pub use provider::{BoxFuture, CalendarProvider, FetchOptions};
pub use raw_event::{RawEvent, RawEventTime};
